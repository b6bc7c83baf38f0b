//! Random-access archive reading: index parse and validation, ordered
//! listing, metadata lookup, and byte-range reads into the data region.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};
use crate::matcher;

use super::header;
use super::node::Node;
use super::unpacked_sibling;

/// An open archive.
///
/// Parses and validates the index on open; the underlying file handle is
/// scoped to this value. Archives are immutable once written, so opening
/// the same container twice returns consistent data.
#[derive(Debug)]
pub struct Archive {
    path: PathBuf,
    root: Node,
    data_offset: u64,
    reader: BufReader<File>,
}

impl Archive {
    /// Open a container and validate its index.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let total = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let index_len = reader
            .read_u64::<LittleEndian>()
            .map_err(|_| Error::CorruptArchive {
                message: "container too short for index length".to_string(),
            })?;
        if index_len > total.saturating_sub(8) {
            return Err(Error::CorruptArchive {
                message: format!(
                    "index length {index_len} exceeds container size {total}"
                ),
            });
        }

        let mut index = vec![0u8; index_len as usize];
        reader
            .read_exact(&mut index)
            .map_err(|_| Error::CorruptArchive {
                message: "truncated index".to_string(),
            })?;

        let data_offset = 8 + index_len;
        let root = header::decode(&index, total - data_offset)?;
        Ok(Self {
            path,
            root,
            data_offset,
            reader,
        })
    }

    /// The container path this archive was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Relative paths of every entry (directories, files, links) in index
    /// order. Always returns the same sequence for the same container.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.root.list()
    }

    /// Metadata for the entry at `path`.
    pub fn stat(&self, path: &str) -> Result<&Node> {
        let rel = matcher::normalize(path);
        self.root
            .get(&rel)
            .ok_or(Error::FileNotFound(rel))
    }

    /// Read a file entry's bytes.
    ///
    /// Packed entries are read from the data region; unpacked entries are
    /// read from the `.unpacked` sibling directory. Directories, links,
    /// and absent paths fail with [`Error::FileNotFound`].
    pub fn read_file(&mut self, path: &str) -> Result<Vec<u8>> {
        let rel = matcher::normalize(path);
        let Some(Node::File(file)) = self.root.get(&rel) else {
            return Err(Error::FileNotFound(rel));
        };

        if file.unpacked {
            let on_disk = unpacked_sibling(&self.path).join(&rel);
            return match fs::read(&on_disk) {
                Ok(data) => Ok(data),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    Err(Error::UnpackedFileMissing { path: on_disk })
                }
                Err(e) => Err(e.into()),
            };
        }

        // Validated on decode; packed files always carry an offset.
        let offset = file.offset.ok_or_else(|| Error::CorruptArchive {
            message: format!("packed file {rel} has no offset"),
        })?;
        let size = file.size;

        self.reader
            .seek(SeekFrom::Start(self.data_offset + offset))?;
        let mut data = vec![0u8; size as usize];
        self.reader
            .read_exact(&mut data)
            .map_err(|_| Error::CorruptArchive {
                message: format!("container truncated reading {rel}"),
            })?;
        Ok(data)
    }
}
