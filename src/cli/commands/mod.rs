use std::path::PathBuf;

use clap::Subcommand;

pub mod extract;
pub mod list;
pub mod pack;

#[derive(Subcommand)]
pub enum Commands {
    /// Pack a directory into an archive
    #[command(alias = "p")]
    Pack {
        /// Source directory
        source: PathBuf,

        /// Output archive file
        destination: PathBuf,

        /// Skip entries whose name starts with a dot
        #[arg(long)]
        exclude_hidden: bool,

        /// Copy files matching this glob to the .unpacked sibling
        /// directory instead of embedding them (repeatable)
        #[arg(long)]
        unpack: Vec<String>,

        /// Copy whole directories matching this glob, and everything
        /// beneath them, to the .unpacked sibling directory (repeatable)
        #[arg(long)]
        unpack_dir: Vec<String>,
    },

    /// List archive entries in index order
    #[command(alias = "l")]
    List {
        /// Archive file
        source: PathBuf,
    },

    /// Extract an entire archive
    #[command(alias = "e")]
    Extract {
        /// Archive file
        source: PathBuf,

        /// Output directory
        destination: PathBuf,
    },

    /// Extract a single entry
    #[command(name = "extract-file", alias = "ef")]
    ExtractFile {
        /// Archive file
        source: PathBuf,

        /// Entry path inside the archive
        path: String,

        /// Write to this file instead of the entry's file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying archive operation fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Pack {
                source,
                destination,
                exclude_hidden,
                unpack,
                unpack_dir,
            } => pack::execute(source, destination, *exclude_hidden, unpack, unpack_dir),
            Commands::List { source } => list::execute(source),
            Commands::Extract {
                source,
                destination,
            } => extract::execute(source, destination),
            Commands::ExtractFile {
                source,
                path,
                output,
            } => extract::execute_file(source, path, output.as_deref()),
        }
    }
}
