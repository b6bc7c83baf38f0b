//! Full-tree reconstruction with destination containment checks.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::matcher;

use super::node::Node;
use super::reader::Archive;

/// What the extraction loop needs to know about an entry, detached from
/// the index tree.
enum Entry {
    Dir,
    File { executable: bool },
    Link { target: String },
}

/// Extract every entry of `container` beneath `dest`.
///
/// Entries are materialized in index order: directories first, then their
/// contents. Any entry (or symlink target) that lexically escapes `dest`
/// aborts the whole extraction with [`Error::UnsafePath`] before it is
/// written; nothing is ever written outside `dest`.
pub fn extract_all(container: &Path, dest: &Path) -> Result<()> {
    let mut archive = Archive::open(container)?;
    fs::create_dir_all(dest).map_err(|e| write_error(dest, e))?;

    for rel in archive.list() {
        // Copy the per-entry metadata out so the file read below can
        // borrow the archive mutably.
        let entry = match archive.stat(&rel)? {
            Node::Directory(_) => Entry::Dir,
            Node::File(file) => Entry::File {
                executable: file.executable,
            },
            Node::Link(link) => Entry::Link {
                target: link.link.clone(),
            },
        };
        let target = safe_join(dest, &rel)?;

        match entry {
            Entry::Dir => {
                fs::create_dir_all(&target).map_err(|e| write_error(&target, e))?;
            }
            Entry::File { executable } => {
                let data = archive.read_file(&rel)?;
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
                }
                fs::write(&target, &data).map_err(|e| write_error(&target, e))?;
                if executable {
                    set_executable(&target).map_err(|e| write_error(&target, e))?;
                }
            }
            Entry::Link { target: link } => {
                let link_target = matcher::normalize(&link);
                // The target is relative to the link's own directory;
                // resolve it against that and require it to stay inside.
                let parent_rel = rel.rsplit_once('/').map_or("", |(parent, _)| parent);
                let combined = if parent_rel.is_empty() {
                    link_target.clone()
                } else {
                    format!("{parent_rel}/{link_target}")
                };
                safe_join(dest, &combined)?;
                recreate_symlink(&link_target, &target)?;
            }
        }
    }
    Ok(())
}

/// Lexically resolve `rel` beneath `dest`, rejecting absolute paths and
/// any traversal that would leave the destination.
fn safe_join(dest: &Path, rel: &str) -> Result<PathBuf> {
    let mut clean = PathBuf::new();
    let mut depth = 0usize;
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(segment) => {
                depth += 1;
                clean.push(segment);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(Error::UnsafePath {
                        path: rel.to_string(),
                    });
                }
                depth -= 1;
                clean.pop();
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::UnsafePath {
                    path: rel.to_string(),
                });
            }
        }
    }
    Ok(dest.join(clean))
}

fn write_error(path: &Path, source: io::Error) -> Error {
    Error::Write {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn recreate_symlink(target: &str, path: &Path) -> Result<()> {
    if path.symlink_metadata().is_ok() {
        fs::remove_file(path).map_err(|e| write_error(path, e))?;
    }
    std::os::unix::fs::symlink(target, path).map_err(|e| write_error(path, e))
}

#[cfg(not(unix))]
fn recreate_symlink(target: &str, path: &Path) -> Result<()> {
    tracing::warn!(
        "skipping symlink {} -> {target}: not supported on this platform",
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_join_accepts_contained_paths() {
        let dest = Path::new("/out");
        assert_eq!(
            safe_join(dest, "dir1/file1.txt").unwrap(),
            PathBuf::from("/out/dir1/file1.txt")
        );
        assert_eq!(
            safe_join(dest, "dir1/../dir2/f").unwrap(),
            PathBuf::from("/out/dir2/f")
        );
    }

    #[test]
    fn safe_join_rejects_escapes() {
        let dest = Path::new("/out");
        assert!(matches!(
            safe_join(dest, "../evil"),
            Err(Error::UnsafePath { .. })
        ));
        assert!(matches!(
            safe_join(dest, "a/../../evil"),
            Err(Error::UnsafePath { .. })
        ));
        assert!(matches!(
            safe_join(dest, "/etc/passwd"),
            Err(Error::UnsafePath { .. })
        ));
    }
}
