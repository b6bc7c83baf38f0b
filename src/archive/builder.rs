//! Source-tree scanning: walks a directory, classifies entries as packed
//! or unpacked, applies the content-transform hook, and produces the index
//! tree plus a byte provider for the writer.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::matcher;

use super::node::{DirectoryNode, FileNode, LinkNode, Node};

/// Content-transform hook, invoked once per file with the original bytes
/// before the file is committed to the tree. The returned bytes entirely
/// replace the input; failure aborts the whole build.
pub trait Transform {
    /// Produce replacement bytes for the file at `path`.
    fn apply(&self, path: &Path, data: Vec<u8>) -> std::result::Result<Vec<u8>, String>;
}

impl<F> Transform for F
where
    F: Fn(&Path, Vec<u8>) -> std::result::Result<Vec<u8>, String>,
{
    fn apply(&self, path: &Path, data: Vec<u8>) -> std::result::Result<Vec<u8>, String> {
        self(path, data)
    }
}

/// Options controlling how a source tree is packed.
pub struct PackOptions {
    /// Include entries whose name starts with a dot. Default: true.
    /// When false such entries are skipped entirely, not just unpacked.
    pub include_hidden: bool,
    /// Glob rules unpacking individual files (matched against the file
    /// name or the full relative path).
    pub unpack_files: Vec<String>,
    /// Glob rules unpacking whole directories, including everything
    /// nested beneath them at any depth.
    pub unpack_dirs: Vec<String>,
    /// Optional content-transform hook.
    pub transform: Option<Box<dyn Transform>>,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            include_hidden: true,
            unpack_files: Vec::new(),
            unpack_dirs: Vec::new(),
            transform: None,
        }
    }
}

impl PackOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether dot-entries are included.
    #[must_use]
    pub fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    /// Set the file-unpack glob rules.
    #[must_use]
    pub fn with_unpack_files(mut self, rules: Vec<String>) -> Self {
        self.unpack_files = rules;
        self
    }

    /// Set the directory-unpack glob rules.
    #[must_use]
    pub fn with_unpack_dirs(mut self, rules: Vec<String>) -> Self {
        self.unpack_dirs = rules;
        self
    }

    /// Install a content-transform hook.
    #[must_use]
    pub fn with_transform(mut self, transform: impl Transform + 'static) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }
}

impl std::fmt::Debug for PackOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackOptions")
            .field("include_hidden", &self.include_hidden)
            .field("unpack_files", &self.unpack_files)
            .field("unpack_dirs", &self.unpack_dirs)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// Byte provider for the writer.
///
/// Untransformed files are re-read from the source tree at write time so
/// large trees are never held in memory; transformed bytes are retained
/// here because they no longer exist on disk.
pub struct PackSource {
    root: PathBuf,
    transformed: HashMap<String, Vec<u8>>,
}

impl PackSource {
    /// Read the post-transform bytes for a relative path.
    pub fn read(&self, rel: &str) -> Result<Vec<u8>> {
        if let Some(data) = self.transformed.get(rel) {
            return Ok(data.clone());
        }
        let path = self.root.join(rel);
        fs::read(&path).map_err(|source| Error::SourceRead { path, source })
    }
}

/// Walk `source` and produce the index tree plus its byte provider.
///
/// The walk is pre-order and sorted by file name for deterministic
/// listings; `WalkDir` keeps its own directory stack, so depth is not
/// bounded by the call stack.
pub fn build(source: &Path, options: &PackOptions) -> Result<(Node, PackSource)> {
    let mut root = Node::new_directory();
    let mut transformed: HashMap<String, Vec<u8>> = HashMap::new();
    let mut unpacked_dirs: HashSet<String> = HashSet::new();

    let include_hidden = options.include_hidden;
    let walker = WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| include_hidden || !is_hidden(entry));

    for entry in walker {
        let entry = entry.map_err(walk_error)?;
        let rel = relative_path(source, entry.path())?;
        let parent_unpacked = ancestor_unpacked(&unpacked_dirs, &rel);
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            let target = fs::read_link(entry.path()).map_err(|source| Error::SourceRead {
                path: entry.path().to_path_buf(),
                source,
            })?;
            if target.is_absolute() {
                return Err(Error::SourceRead {
                    path: entry.path().to_path_buf(),
                    source: io::Error::other("absolute symlink target"),
                });
            }
            let link = target.to_string_lossy().replace('\\', "/");
            insert(&mut root, &rel, Node::Link(LinkNode { link }));
        } else if file_type.is_dir() {
            let unpacked =
                parent_unpacked || matcher::is_unpacked_dir(&rel, &options.unpack_dirs);
            if unpacked {
                unpacked_dirs.insert(rel.clone());
            }
            insert(
                &mut root,
                &rel,
                Node::Directory(DirectoryNode {
                    files: indexmap::IndexMap::new(),
                    unpacked,
                }),
            );
        } else {
            let metadata = entry.metadata().map_err(walk_error)?;
            let executable = is_executable(&metadata);
            let (size, data) = match &options.transform {
                Some(transform) => {
                    let original =
                        fs::read(entry.path()).map_err(|source| Error::SourceRead {
                            path: entry.path().to_path_buf(),
                            source,
                        })?;
                    let replaced = transform.apply(entry.path(), original).map_err(
                        |message| Error::Transform {
                            path: entry.path().to_path_buf(),
                            message,
                        },
                    )?;
                    (replaced.len() as u64, Some(replaced))
                }
                None => (metadata.len(), None),
            };
            let unpacked =
                parent_unpacked || matcher::is_unpacked_file(&rel, &options.unpack_files);
            if let Some(data) = data {
                transformed.insert(rel.clone(), data);
            }
            insert(
                &mut root,
                &rel,
                Node::File(FileNode {
                    size,
                    offset: None,
                    executable,
                    unpacked,
                }),
            );
        }
    }

    let source_bytes = PackSource {
        root: source.to_path_buf(),
        transformed,
    };
    Ok((root, source_bytes))
}

/// Insert a node at a slash-separated relative path, creating intermediate
/// directories if the walk somehow skipped them.
fn insert(root: &mut Node, rel: &str, node: Node) {
    let mut segments: Vec<&str> = rel.split('/').filter(|s| !s.is_empty()).collect();
    let Some(name) = segments.pop() else {
        return;
    };

    let mut current = root;
    for segment in segments {
        let Node::Directory(dir) = current else {
            return;
        };
        current = dir
            .files
            .entry(segment.to_string())
            .or_insert_with(Node::new_directory);
    }
    if let Node::Directory(dir) = current {
        dir.files.insert(name.to_string(), node);
    }
}

/// Unpack status propagates unconditionally from parent directories; the
/// parent was visited (and recorded) before any of its children.
fn ancestor_unpacked(unpacked_dirs: &HashSet<String>, rel: &str) -> bool {
    rel.rfind('/')
        .is_some_and(|i| unpacked_dirs.contains(&rel[..i]))
}

fn relative_path(root: &Path, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(root).map_err(|_| Error::SourceRead {
        path: path.to_path_buf(),
        source: io::Error::other("entry outside source root"),
    })?;
    Ok(rel.to_string_lossy().replace('\\', "/"))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn walk_error(err: walkdir::Error) -> Error {
    let path = err
        .path()
        .map_or_else(PathBuf::new, std::path::Path::to_path_buf);
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("directory walk error"));
    Error::SourceRead { path, source }
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}
