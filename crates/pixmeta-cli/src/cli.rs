// crates/pixmeta-cli/src/cli.rs
use clap::{Parser, Subcommand, ValueEnum};

/// pixmeta - Batch image metadata inspector
#[derive(Parser)]
#[command(name = "pixmeta")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Disable progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Number of parallel jobs (0 = auto-detect)
    #[arg(short, long, global = true, default_value = "0")]
    pub jobs: usize,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report format, size, DPI, depth and compression of image files
    Analyze {
        /// Files, directories or glob patterns (e.g. ./scans/*.tif)
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Output style (defaults to the configured one)
        #[arg(short, long, value_enum)]
        output: Option<OutputMode>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Configuration key
        key: String,

        /// Configuration value
        value: String,
    },

    /// Reset to defaults
    Reset,

    /// Show config file path
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Aligned table with a summary line
    Table,
    /// JSON array of reports
    Json,
}
