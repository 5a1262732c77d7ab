//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{ScrollArg, SkipKind};

/// Record mouse and keyboard activity and replay it later
#[derive(Parser, Debug)]
#[command(name = "action-recorder")]
#[command(version, about = "Capture and replay mouse and keyboard input", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Recordings directory (overrides config)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record input until the stop key (Esc) or Ctrl+C
    Record {
        /// Do not record keyboard input
        #[arg(long)]
        no_keyboard: bool,

        /// Maximum events per stream
        #[arg(long)]
        max_events: Option<usize>,

        /// How scrolls are replayed
        #[arg(long, value_enum)]
        scroll: Option<ScrollArg>,
    },
    /// List recordings, newest first
    List,
    /// Replay a recording
    Replay {
        /// Recording id (from list)
        id: String,

        /// Fire events back-to-back instead of at recorded times
        #[arg(long)]
        no_precision: bool,

        /// Number of passes (1-10)
        #[arg(long, short, default_value = "1")]
        loops: u32,

        /// Event kinds to leave out
        #[arg(long, value_enum, value_delimiter = ',')]
        skip: Vec<SkipKind>,
    },
    /// Delete recordings
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Export recordings to one JSON document
    Export {
        #[arg(required = true)]
        ids: Vec<String>,

        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Import recordings from an exported JSON document
    Import { file: PathBuf },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
