//! CLI tool for reading files inside containers.

mod commands;
mod exit_codes;
mod output;

use clap::{Parser, Subcommand, ValueEnum};

use zipvfs::{ArchiveConfig, VirtualFileSystem};

/// Read files inside zip, tar, bzip2 and xz containers
#[derive(Parser)]
#[command(name = "zipvfs")]
#[command(
    author,
    version,
    about = "Read files inside zip, tar, bzip2 and xz containers",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Token separating the archive from the path inside it (archive:// only)
    #[arg(long, short = 's', env = "ZIPVFS_SPLIT", global = true)]
    split: Option<String>,

    /// Archive suffix used when no split token is given (archive:// only)
    #[arg(long, short = 'e', env = "ZIPVFS_EXTENSION", default_value = ".zip", global = true)]
    extension: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a file's contents to stdout
    Cat {
        /// Composite or plain path
        path: String,
    },

    /// List paths matching a pattern (alias: l)
    #[command(alias = "l")]
    Ls {
        /// Composite or plain glob pattern
        pattern: String,
    },

    /// Check whether a file exists; exits non-zero if it does not
    Exists {
        /// Composite or plain path
        path: String,
    },

    /// Show size and metadata of a file
    Stat {
        /// Composite or plain path
        path: String,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

impl Cli {
    fn config(&self) -> ArchiveConfig {
        let config = ArchiveConfig::new().extension(self.extension.clone());
        match &self.split {
            Some(token) => config.split(token.clone()),
            None => config,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let vfs = VirtualFileSystem::new();
    vfs.set_config(cli.config());

    let exit_code = match &cli.command {
        Commands::Cat { path } => commands::cat(&vfs, path),
        Commands::Ls { pattern } => commands::ls(&vfs, pattern, cli.format),
        Commands::Exists { path } => commands::exists(&vfs, path, cli.format),
        Commands::Stat { path } => commands::stat(&vfs, path, cli.format),
    };

    std::process::exit(exit_code.code());
}
