//! Error types for `ashar`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `ashar` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error for the archive index.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ==================== Build Errors ====================
    /// A source file or directory could not be read during packing.
    #[error("failed to read source entry {path}: {source}")]
    SourceRead {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The content-transform hook rejected a file.
    #[error("transform failed for {path}: {message}")]
    Transform {
        /// The path handed to the transform.
        path: PathBuf,
        /// The message returned by the transform.
        message: String,
    },

    // ==================== Archive Read Errors ====================
    /// The archive index failed validation on open.
    #[error("corrupt archive: {message}")]
    CorruptArchive {
        /// Description of the validation failure.
        message: String,
    },

    /// The requested path is not a file entry in the archive index.
    #[error("file not found in archive: {0}")]
    FileNotFound(String),

    /// The index marks the entry unpacked but the sibling file is absent.
    #[error("unpacked file missing on disk: {path}")]
    UnpackedFileMissing {
        /// The expected path under the `.unpacked` sibling directory.
        path: PathBuf,
    },

    // ==================== Extraction Errors ====================
    /// An index entry resolves outside the extraction destination.
    #[error("entry escapes extraction destination: {path}")]
    UnsafePath {
        /// The offending relative path.
        path: String,
    },

    /// The destination could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        /// The path being written.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },
}

/// A specialized Result type for `ashar` operations.
pub type Result<T> = std::result::Result<T, Error>;
