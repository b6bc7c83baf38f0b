//! Archive index tree model.
//!
//! The index is a nested JSON document in asar's layout: a directory is
//! `{"files": {...}}` with insertion-ordered keys, a file carries `size`
//! plus an `offset` into the data region (serialized as a decimal string),
//! and a symlink carries its relative `link` target.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single entry in the archive index.
///
/// Trees are produced by the builder (pack path) or by decoding an
/// existing index (read path) and are not mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// A directory with insertion-ordered children.
    Directory(DirectoryNode),
    /// A symbolic link.
    Link(LinkNode),
    /// A regular file.
    File(FileNode),
}

/// Directory entry: ordered mapping of child name to node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryNode {
    /// Children in traversal order.
    pub files: IndexMap<String, Node>,
    /// True when the whole subtree lives in the `.unpacked` sibling.
    #[serde(default, skip_serializing_if = "is_false")]
    pub unpacked: bool,
}

/// Regular-file entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    /// Byte length of the file contents.
    pub size: u64,
    /// Offset within the data region. Packed files only; unpacked files
    /// carry no offset. Serialized as a decimal string since JSON numbers
    /// cannot represent the full 64-bit range.
    #[serde(
        default,
        with = "offset_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub offset: Option<u64>,
    /// Whether the executable bit was set on the source file.
    #[serde(default, skip_serializing_if = "is_false")]
    pub executable: bool,
    /// Whether the bytes live in the `.unpacked` sibling directory.
    #[serde(default, skip_serializing_if = "is_false")]
    pub unpacked: bool,
}

/// Symlink entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkNode {
    /// Relative target path, forward-slash normalized.
    pub link: String,
}

impl Node {
    /// A fresh empty directory node.
    #[must_use]
    pub fn new_directory() -> Self {
        Node::Directory(DirectoryNode::default())
    }

    /// Look up a node by slash-separated relative path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Node> {
        let mut node = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            match node {
                Node::Directory(dir) => node = dir.files.get(segment)?,
                _ => return None,
            }
        }
        Some(node)
    }

    /// Pre-order relative paths of every entry beneath this node.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect("", &mut out);
        out
    }

    fn collect(&self, prefix: &str, out: &mut Vec<String>) {
        if let Node::Directory(dir) = self {
            for (name, child) in &dir.files {
                let path = join_rel(prefix, name);
                out.push(path.clone());
                child.collect(&path, out);
            }
        }
    }
}

/// Join a relative prefix and a child name with a forward slash.
pub(crate) fn join_rel(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

mod offset_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        offset: &Option<u64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match offset {
            Some(value) => serializer.serialize_str(&value.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u64>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        value
            .map(|s| s.parse::<u64>().map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_file_and_link_round_trip() {
        let json = r#"{"files":{"dir1":{"files":{"file1.txt":{"size":6,"offset":"0"}}},"link":{"link":"dir1/file1.txt"},"big":{"size":1,"offset":"6","executable":true},"loose.txt":{"size":4,"unpacked":true}}}"#;
        let root: Node = serde_json::from_str(json).unwrap();

        assert!(matches!(root.get("dir1"), Some(Node::Directory(_))));
        match root.get("dir1/file1.txt") {
            Some(Node::File(file)) => {
                assert_eq!(file.size, 6);
                assert_eq!(file.offset, Some(0));
                assert!(!file.executable);
            }
            other => panic!("unexpected node: {other:?}"),
        }
        match root.get("link") {
            Some(Node::Link(link)) => assert_eq!(link.link, "dir1/file1.txt"),
            other => panic!("unexpected node: {other:?}"),
        }
        match root.get("loose.txt") {
            Some(Node::File(file)) => {
                assert!(file.unpacked);
                assert_eq!(file.offset, None);
            }
            other => panic!("unexpected node: {other:?}"),
        }

        let reencoded = serde_json::to_string(&root).unwrap();
        assert_eq!(reencoded, json);
    }

    #[test]
    fn listing_is_pre_order() {
        let json = r#"{"files":{"dir1":{"files":{"a.txt":{"size":1,"offset":"0"}}},"dir2":{"files":{"b.txt":{"size":1,"offset":"1"}}}}}"#;
        let root: Node = serde_json::from_str(json).unwrap();
        assert_eq!(
            root.list(),
            vec!["dir1", "dir1/a.txt", "dir2", "dir2/b.txt"]
        );
    }

    #[test]
    fn lookup_through_file_fails() {
        let json = r#"{"files":{"a.txt":{"size":1,"offset":"0"}}}"#;
        let root: Node = serde_json::from_str(json).unwrap();
        assert!(root.get("a.txt/child").is_none());
        assert!(root.get("missing").is_none());
    }
}
