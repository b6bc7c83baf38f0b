//! CLI command for listing archive contents

use std::path::Path;

use crate::archive::ArchiveOperations;

pub fn execute(source: &Path) -> anyhow::Result<()> {
    let entries = ArchiveOperations::list_package(source)?;
    for entry in &entries {
        println!("{}", display_path(entry));
    }
    Ok(())
}

/// Paths are stored with forward slashes; show them with the platform
/// separator.
#[cfg(windows)]
fn display_path(path: &str) -> String {
    path.replace('/', "\\")
}

#[cfg(not(windows))]
fn display_path(path: &str) -> String {
    path.to_string()
}
