//! Solution pack commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::Value;

use fsr_http::FortiSoar;
use fsr_http::api::DEFAULT_SEARCH_LIMIT;

use crate::output;

#[derive(Args, Debug)]
pub struct PacksCommand {
    #[command(subcommand)]
    pub command: PacksSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PacksSubcommand {
    /// Search solution packs by name
    Search {
        term: String,

        /// Search the content hub instead of installed packs
        #[arg(long)]
        available: bool,

        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },

    /// Export an installed solution pack through its template
    Export {
        name: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub async fn handle(client: &FortiSoar, cmd: PacksCommand) -> Result<()> {
    let packs = client.solution_packs();

    match cmd.command {
        PacksSubcommand::Search {
            term,
            available,
            limit,
        } => {
            let found = if available {
                packs.search_available(&term, limit).await
            } else {
                packs.search_installed(&term, limit).await
            }
            .context("Failed to search solution packs")?;

            if found.is_empty() {
                eprintln!("No solution packs match '{term}'");
            }
            for pack in &found {
                println!("{}", summary(pack));
            }
        }
        PacksSubcommand::Export { name, output } => {
            let path = packs
                .export_pack(&name, output.as_deref())
                .await
                .with_context(|| format!("Failed to export solution pack '{name}'"))?;
            output::success("Export complete");
            output::field("File", path.display());
        }
    }

    Ok(())
}

/// One line per pack: label, name and version.
fn summary(pack: &Value) -> String {
    let field = |key: &str| pack.get(key).and_then(Value::as_str).unwrap_or("-");
    format!("{}\t{}\t{}", field("label"), field("name"), field("version"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_fills_missing_fields() {
        let pack = json!({"label": "SOAR Framework", "name": "SOARFramework"});
        assert_eq!(summary(&pack), "SOAR Framework\tSOARFramework\t-");
    }
}
