//! Container emission: length-prefixed index followed by the packed file
//! bytes, plus the `.unpacked` sibling directory when any entry is
//! unpacked.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{Error, Result};

use super::builder::PackSource;
use super::header;
use super::node::{Node, join_rel};
use super::unpacked_sibling;

/// Write `tree` to `dest`, overwriting any existing file.
///
/// Success is reported only after all container bytes are flushed. The
/// sibling `<dest>.unpacked` directory is created only when at least one
/// entry is unpacked.
pub fn write(tree: &mut Node, dest: &Path, source: &PackSource) -> Result<()> {
    let (index, data_len) = header::encode(tree)?;

    if let Some(parent) = dest.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
    }

    let file = File::create(dest).map_err(|e| write_error(dest, e))?;
    let mut out = BufWriter::new(file);
    out.write_u64::<LittleEndian>(index.len() as u64)
        .map_err(|e| write_error(dest, e))?;
    out.write_all(&index).map_err(|e| write_error(dest, e))?;

    let mut written = 0u64;
    copy_packed(tree, "", &mut out, dest, source, &mut written)?;
    debug_assert_eq!(written, data_len);
    out.flush().map_err(|e| write_error(dest, e))?;

    if has_unpacked(tree) {
        let sibling = unpacked_sibling(dest);
        write_unpacked(tree, "", &sibling, source, false)?;
    }
    Ok(())
}

/// Append packed file bytes in index (pre-order) order.
fn copy_packed<W: Write>(
    node: &Node,
    rel: &str,
    out: &mut W,
    dest: &Path,
    source: &PackSource,
    written: &mut u64,
) -> Result<()> {
    match node {
        Node::Directory(dir) => {
            for (name, child) in &dir.files {
                copy_packed(child, &join_rel(rel, name), out, dest, source, written)?;
            }
        }
        Node::File(file) if !file.unpacked => {
            let data = source.read(rel)?;
            if data.len() as u64 != file.size {
                return Err(Error::Write {
                    path: dest.to_path_buf(),
                    source: io::Error::other(format!(
                        "source file {rel} changed size during pack ({} != {})",
                        data.len(),
                        file.size
                    )),
                });
            }
            out.write_all(&data).map_err(|e| write_error(dest, e))?;
            *written += file.size;
        }
        _ => {}
    }
    Ok(())
}

/// Mirror the unpacked subset of the tree into the sibling directory.
///
/// Links carry no unpacked flag of their own; they are mirrored exactly
/// when an ancestor directory is unpacked.
fn write_unpacked(
    node: &Node,
    rel: &str,
    sibling: &Path,
    source: &PackSource,
    parent_unpacked: bool,
) -> Result<()> {
    match node {
        Node::Directory(dir) => {
            if dir.unpacked {
                let path = sibling.join(rel);
                fs::create_dir_all(&path).map_err(|e| write_error(&path, e))?;
            }
            for (name, child) in &dir.files {
                write_unpacked(child, &join_rel(rel, name), sibling, source, dir.unpacked)?;
            }
        }
        Node::File(file) if file.unpacked => {
            let path = sibling.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
            }
            let data = source.read(rel)?;
            fs::write(&path, &data).map_err(|e| write_error(&path, e))?;
            if file.executable {
                set_executable(&path).map_err(|e| write_error(&path, e))?;
            }
        }
        Node::Link(link) if parent_unpacked => {
            recreate_symlink(&link.link, &sibling.join(rel))?;
        }
        _ => {}
    }
    Ok(())
}

fn has_unpacked(node: &Node) -> bool {
    match node {
        Node::Directory(dir) => dir.unpacked || dir.files.values().any(has_unpacked),
        Node::File(file) => file.unpacked,
        Node::Link(_) => false,
    }
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
