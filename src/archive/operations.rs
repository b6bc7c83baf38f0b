//! High-level archive operations.

use std::path::Path;

use crate::error::Result;

use super::builder::{self, PackOptions};
use super::reader::Archive;
use super::{extractor, writer};

/// High-level archive operations.
pub struct ArchiveOperations;

impl ArchiveOperations {
    /// Pack a directory into an archive with default options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceRead`] if the source tree cannot be read and
    /// [`Error::Write`] if the destination cannot be written.
    ///
    /// [`Error::SourceRead`]: crate::Error::SourceRead
    /// [`Error::Write`]: crate::Error::Write
    pub fn create_package<P: AsRef<Path>>(source: P, dest: P) -> Result<()> {
        Self::create_package_with_options(source, dest, PackOptions::default())
    }

    /// Pack a directory into an archive.
    ///
    /// `options` controls the hidden-file policy, the unpack rules, and
    /// the content-transform hook.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceRead`] if the source tree cannot be read,
    /// [`Error::Transform`] if the transform hook fails, and
    /// [`Error::Write`] if the destination cannot be written.
    ///
    /// [`Error::SourceRead`]: crate::Error::SourceRead
    /// [`Error::Transform`]: crate::Error::Transform
    /// [`Error::Write`]: crate::Error::Write
    pub fn create_package_with_options<P: AsRef<Path>>(
        source: P,
        dest: P,
        options: PackOptions,
    ) -> Result<()> {
        let source = source.as_ref();
        let dest = dest.as_ref();

        tracing::info!("Scanning directory: {:?}", source);
        let (mut tree, bytes) = builder::build(source, &options)?;

        tracing::info!("Writing archive: {:?}", dest);
        writer::write(&mut tree, dest, &bytes)?;

        tracing::info!("Archive created successfully");
        Ok(())
    }

    /// List the entries of an archive in index order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptArchive`] if the index fails validation.
    ///
    /// [`Error::CorruptArchive`]: crate::Error::CorruptArchive
    pub fn list_package<P: AsRef<Path>>(archive: P) -> Result<Vec<String>> {
        Ok(Archive::open(archive)?.list())
    }

    /// Read a single file's bytes out of an archive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if `path` is absent or not a file,
    /// and [`Error::UnpackedFileMissing`] if the entry is unpacked but its
    /// sibling file is gone.
    ///
    /// [`Error::FileNotFound`]: crate::Error::FileNotFound
    /// [`Error::UnpackedFileMissing`]: crate::Error::UnpackedFileMissing
    pub fn extract_file<P: AsRef<Path>>(archive: P, path: &str) -> Result<Vec<u8>> {
        Archive::open(archive)?.read_file(path)
    }

    /// Extract an entire archive beneath `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsafePath`] if any entry would escape `dest` and
    /// [`Error::Write`] if the destination cannot be written.
    ///
    /// [`Error::UnsafePath`]: crate::Error::UnsafePath
    /// [`Error::Write`]: crate::Error::Write
    pub fn extract_all<P: AsRef<Path>>(archive: P, dest: P) -> Result<()> {
        let archive = archive.as_ref();
        let dest = dest.as_ref();

        tracing::info!("Extracting {:?} to {:?}", archive, dest);
        extractor::extract_all(archive, dest)
    }
}
