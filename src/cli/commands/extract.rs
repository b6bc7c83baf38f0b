//! CLI commands for archive extraction

use std::path::{Path, PathBuf};

use crate::archive::ArchiveOperations;

/// Extract the whole archive beneath `destination`.
pub fn execute(source: &Path, destination: &Path) -> anyhow::Result<()> {
    ArchiveOperations::extract_all(source, destination)?;
    println!("Extracted to {}", destination.display());
    Ok(())
}

/// Extract a single entry, to `output` or the entry's file name in the
/// current directory.
pub fn execute_file(source: &Path, path: &str, output: Option<&Path>) -> anyhow::Result<()> {
    let data = ArchiveOperations::extract_file(source, path)?;

    let out = match output {
        Some(out) => out.to_path_buf(),
        None => PathBuf::from(path.rsplit('/').next().unwrap_or(path)),
    };
    std::fs::write(&out, data)?;
    println!("Wrote {}", out.display());
    Ok(())
}
