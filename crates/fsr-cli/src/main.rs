//! fsr - command line client for FortiSOAR.
//!
//! A thin wrapper over `fsr-http`. Connection settings come from
//! `config.toml` and `FSR_*` environment variables.

mod cli;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env();
    let client = config.client(cli.insecure)?;

    match cli.command {
        Commands::Check(args) => commands::check::run(&client, args).await,
        Commands::Alerts(cmd) => commands::alerts::handle(&client, cmd).await,
        Commands::Files(cmd) => commands::files::handle(&client, cmd).await,
        Commands::Export(cmd) => commands::export::handle(&client, cmd).await,
        Commands::Packs(cmd) => commands::packs::handle(&client, cmd).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so command output on stdout stays machine readable.
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
