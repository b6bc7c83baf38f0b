//! # ashar
//!
//! Pack a directory tree — files, directories, symlinks — into a single
//! random-access archive, and reconstruct it fully or file-by-file.
//! Entries selected by glob rules are *unpacked*: copied to a sibling
//! `<archive>.unpacked` directory instead of embedded, so tools that need
//! direct filesystem access to specific files can still reach them.
//!
//! The container is a length-prefixed JSON index followed by the packed
//! file bytes concatenated tightly in index order. No compression, no
//! encryption.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ashar::archive::ArchiveOperations;
//!
//! // Pack a directory
//! ArchiveOperations::create_package("app/", "app.ashar")?;
//!
//! // List contents
//! let entries = ArchiveOperations::list_package("app.ashar")?;
//! println!("{} entries", entries.len());
//!
//! // Read one file without extracting
//! let data = ArchiveOperations::extract_file("app.ashar", "dir1/file1.txt")?;
//!
//! // Reconstruct the whole tree
//! ArchiveOperations::extract_all("app.ashar", "app-out/")?;
//! # Ok::<(), ashar::Error>(())
//! ```
//!
//! ## Unpack rules
//!
//! ```no_run
//! use ashar::archive::{ArchiveOperations, PackOptions};
//!
//! let options = PackOptions::new()
//!     .with_unpack_files(vec!["*.png".to_string()])
//!     .with_unpack_dirs(vec!["**/{x1,x2}".to_string()]);
//! ArchiveOperations::create_package_with_options("app/", "app.ashar", options)?;
//! # Ok::<(), ashar::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `ashar` command-line binary

pub mod archive;
pub mod error;
pub mod matcher;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::archive::{
        Archive, ArchiveOperations, DirectoryNode, FileNode, LinkNode, Node, PackOptions,
        Transform,
    };
    pub use crate::error::{Error, Result};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
