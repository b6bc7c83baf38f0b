//! Index codec: offset assignment, JSON encode/decode, corruption checks.
//!
//! Offsets are assigned to packed files in pre-order, the same order the
//! writer emits their bytes, so the data region is a tight concatenation:
//! the first offset is 0 and `offset[i] + size[i] == offset[i + 1]`.

use crate::error::{Error, Result};

use super::node::{Node, join_rel};

/// Assign data-region offsets and serialize the index.
///
/// Returns the index bytes and the total size of the data region.
pub(crate) fn encode(root: &mut Node) -> Result<(Vec<u8>, u64)> {
    let mut offset = 0u64;
    assign_offsets(root, &mut offset);
    let bytes = serde_json::to_vec(root)?;
    Ok((bytes, offset))
}

/// Parse an index and validate it against the container's data region.
///
/// Fails with [`Error::CorruptArchive`] when offsets are missing,
/// non-tight, or the declared data size disagrees with `data_len`.
pub(crate) fn decode(bytes: &[u8], data_len: u64) -> Result<Node> {
    let root: Node = serde_json::from_slice(bytes)
        .map_err(|e| Error::CorruptArchive {
            message: format!("invalid index: {e}"),
        })?;
    if !matches!(root, Node::Directory(_)) {
        return Err(Error::CorruptArchive {
            message: "index root is not a directory".to_string(),
        });
    }

    let mut expected = 0u64;
    check_offsets(&root, "", &mut expected)?;
    if expected != data_len {
        return Err(Error::CorruptArchive {
            message: format!(
                "index declares {expected} data bytes but container holds {data_len}"
            ),
        });
    }
    Ok(root)
}

fn assign_offsets(node: &mut Node, offset: &mut u64) {
    match node {
        Node::Directory(dir) => {
            for child in dir.files.values_mut() {
                assign_offsets(child, offset);
            }
        }
        Node::File(file) if !file.unpacked => {
            file.offset = Some(*offset);
            *offset += file.size;
        }
        _ => {}
    }
}

fn check_offsets(node: &Node, path: &str, expected: &mut u64) -> Result<()> {
    match node {
        Node::Directory(dir) => {
            for (name, child) in &dir.files {
                let child_path = join_rel(path, name);
                check_offsets(child, &child_path, expected)?;
            }
        }
        Node::File(file) => {
            if file.unpacked {
                if file.offset.is_some() {
                    return Err(Error::CorruptArchive {
                        message: format!("unpacked file {path} carries an offset"),
                    });
                }
            } else {
                let want = *expected;
                match file.offset {
                    Some(offset) if offset == want => {
                        *expected = want.checked_add(file.size).ok_or_else(|| {
                            Error::CorruptArchive {
                                message: format!(
                                    "file {path} size overflows the data region"
                                ),
                            }
                        })?;
                    }
                    Some(offset) => {
                        return Err(Error::CorruptArchive {
                            message: format!(
                                "file {path} at offset {offset}, expected {want}"
                            ),
                        });
                    }
                    None => {
                        return Err(Error::CorruptArchive {
                            message: format!("packed file {path} has no offset"),
                        });
                    }
                }
            }
        }
        Node::Link(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::node::{DirectoryNode, FileNode};
    use super::*;

    fn file(size: u64, unpacked: bool) -> Node {
        Node::File(FileNode {
            size,
            offset: None,
            executable: false,
            unpacked,
        })
    }

    fn tree(entries: Vec<(&str, Node)>) -> Node {
        let mut dir = DirectoryNode::default();
        for (name, node) in entries {
            dir.files.insert(name.to_string(), node);
        }
        Node::Directory(dir)
    }

    #[test]
    fn encode_assigns_tight_offsets_skipping_unpacked() {
        let mut root = tree(vec![
            ("a.txt", file(5, false)),
            ("b.bin", file(0, false)),
            ("c.png", file(7, true)),
            ("sub", tree(vec![("d.txt", file(3, false))])),
        ]);
        let (bytes, data_len) = encode(&mut root).unwrap();
        assert_eq!(data_len, 8);

        let offsets: Vec<Option<u64>> = ["a.txt", "b.bin", "c.png", "sub/d.txt"]
            .iter()
            .map(|path| match root.get(path) {
                Some(Node::File(f)) => f.offset,
                other => panic!("unexpected node for {path}: {other:?}"),
            })
            .collect();
        assert_eq!(offsets, vec![Some(0), Some(5), None, Some(5)]);

        // The encoded index decodes back against its own data length.
        let decoded = decode(&bytes, data_len).unwrap();
        assert_eq!(decoded.list(), root.list());
    }

    #[test]
    fn decode_rejects_gapped_offsets() {
        let json = br#"{"files":{"a.txt":{"size":5,"offset":"0"},"b.txt":{"size":3,"offset":"6"}}}"#;
        let err = decode(json, 9).unwrap_err();
        assert!(matches!(err, Error::CorruptArchive { .. }), "{err}");
    }

    #[test]
    fn decode_rejects_data_length_mismatch() {
        let json = br#"{"files":{"a.txt":{"size":5,"offset":"0"}}}"#;
        assert!(decode(json, 5).is_ok());
        let err = decode(json, 4).unwrap_err();
        assert!(matches!(err, Error::CorruptArchive { .. }), "{err}");
    }

    #[test]
    fn decode_rejects_sizes_summing_past_u64() {
        // The wrapped sum equals the real data length; the check must
        // still fail rather than wrap around.
        let json = br#"{"files":{"a":{"size":18446744073709551615,"offset":"0"},"b":{"size":9,"offset":"18446744073709551615"}}}"#;
        let err = decode(json, 8).unwrap_err();
        assert!(matches!(err, Error::CorruptArchive { .. }), "{err}");
    }

    #[test]
    fn decode_rejects_packed_file_without_offset() {
        let json = br#"{"files":{"a.txt":{"size":5}}}"#;
        let err = decode(json, 5).unwrap_err();
        assert!(matches!(err, Error::CorruptArchive { .. }), "{err}");
    }

    #[test]
    fn multibyte_names_round_trip() {
        let mut root = tree(vec![("女の子.txt", file(4, false))]);
        let (bytes, data_len) = encode(&mut root).unwrap();
        let decoded = decode(&bytes, data_len).unwrap();
        assert_eq!(decoded.list(), vec!["女の子.txt"]);
    }
}
