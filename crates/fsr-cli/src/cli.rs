//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::alerts::AlertsCommand;
use crate::commands::check::CheckArgs;
use crate::commands::export::ExportCommand;
use crate::commands::files::FilesCommand;
use crate::commands::packs::PacksCommand;

/// Command line client for the FortiSOAR REST API.
#[derive(Parser, Debug)]
#[command(name = "fsr")]
#[command(author, version = env!("FSR_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Path to config.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the configured credentials are accepted
    Check(CheckArgs),

    /// Alert records
    Alerts(AlertsCommand),

    /// File uploads and attachments
    Files(FilesCommand),

    /// Configuration export
    Export(ExportCommand),

    /// Solution packs
    Packs(PacksCommand),
}
