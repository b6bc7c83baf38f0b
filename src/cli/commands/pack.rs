//! CLI command for archive creation

use std::path::Path;

use crate::archive::{ArchiveOperations, PackOptions};

pub fn execute(
    source: &Path,
    destination: &Path,
    exclude_hidden: bool,
    unpack: &[String],
    unpack_dir: &[String],
) -> anyhow::Result<()> {
    if !source.is_dir() {
        anyhow::bail!("source is not a directory: {}", source.display());
    }

    let options = PackOptions::new()
        .with_hidden(!exclude_hidden)
        .with_unpack_files(unpack.to_vec())
        .with_unpack_dirs(unpack_dir.to_vec());

    ArchiveOperations::create_package_with_options(source, destination, options)?;
    println!("Created {}", destination.display());
    Ok(())
}
