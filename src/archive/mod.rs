//! Archive engine: tree building, index codec, container read/write,
//! extraction.

mod builder;
mod extractor;
mod header;
mod node;
mod operations;
mod reader;
mod writer;

// Primary public API
pub use operations::ArchiveOperations;
pub use reader::Archive;

// Engine pieces for callers that need finer control
pub use builder::{PackOptions, PackSource, Transform, build};
pub use extractor::extract_all;
pub use node::{DirectoryNode, FileNode, LinkNode, Node};
pub use writer::write;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// The sibling directory holding unpacked entries: `<container>.unpacked`.
pub(crate) fn unpacked_sibling(container: &Path) -> PathBuf {
    let mut name = OsString::from(container.as_os_str());
    name.push(".unpacked");
    PathBuf::from(name)
}
