//! Alert commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use fsr_core::ListParams;
use fsr_http::FortiSoar;

use super::parse_object;
use crate::output;

#[derive(Args, Debug)]
pub struct AlertsCommand {
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: AlertsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AlertsSubcommand {
    /// List alerts, one JSON record per line
    List {
        /// Page size
        #[arg(long)]
        limit: Option<u32>,

        /// Page number, starting at 1
        #[arg(long)]
        page: Option<u32>,

        /// Free text search
        #[arg(long)]
        search: Option<String>,
    },

    /// Fetch one alert by UUID
    Get { id: String },

    /// Create an alert from a JSON object
    Create {
        #[arg(long)]
        data: String,
    },

    /// Update fields of an alert
    Update {
        id: String,

        #[arg(long)]
        data: String,
    },

    /// Delete an alert
    Delete { id: String },
}

pub async fn handle(client: &FortiSoar, cmd: AlertsCommand) -> Result<()> {
    let alerts = client.alerts();
    let pretty = cmd.pretty;

    match cmd.command {
        AlertsSubcommand::List {
            limit,
            page,
            search,
        } => {
            let mut params = ListParams::new();
            if let Some(limit) = limit {
                params = params.limit(limit);
            }
            if let Some(page) = page {
                params = params.page(page);
            }
            if let Some(search) = search {
                params = params.search(search);
            }

            let page = alerts.list(&params).await.context("Failed to list alerts")?;
            output::records(&page.members, pretty)?;
            if let Some(total) = page.total_items {
                eprintln!("{} of {} alerts", page.members.len(), total);
            }
        }
        AlertsSubcommand::Get { id } => {
            let record = alerts.get(&id).await.context("Failed to get alert")?;
            output::json(&record, pretty)?;
        }
        AlertsSubcommand::Create { data } => {
            let record = alerts
                .create(parse_object(&data)?)
                .await
                .context("Failed to create alert")?;
            output::json(&record, pretty)?;
        }
        AlertsSubcommand::Update { id, data } => {
            let record = alerts
                .update(&id, parse_object(&data)?)
                .await
                .context("Failed to update alert")?;
            output::json(&record, pretty)?;
        }
        AlertsSubcommand::Delete { id } => {
            alerts.delete(&id).await.context("Failed to delete alert")?;
            output::success(format_args!("Deleted alert {id}"));
        }
    }

    Ok(())
}
