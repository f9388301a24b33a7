//! Configuration export commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use fsr_core::SimplifiedTemplate;
use fsr_http::FortiSoar;

use crate::output;

#[derive(Args, Debug)]
pub struct ExportCommand {
    #[command(subcommand)]
    pub command: ExportSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ExportSubcommand {
    /// Export with an existing template, looked up by name
    ByName {
        name: String,

        /// Output file (defaults to a name derived from the template)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export with an existing template UUID
    ByUuid {
        uuid: String,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create a template from names and export it
    Create {
        /// Template name
        name: String,

        /// Module to export, repeatable
        #[arg(long = "module")]
        modules: Vec<String>,

        /// Picklist name, repeatable
        #[arg(long = "picklist")]
        picklists: Vec<String>,

        /// Connector label, repeatable
        #[arg(long = "connector")]
        connectors: Vec<String>,

        /// Playbook collection name, repeatable
        #[arg(long = "collection")]
        collections: Vec<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub async fn handle(client: &FortiSoar, cmd: ExportCommand) -> Result<()> {
    let export = client.export_config();

    let path = match cmd.command {
        ExportSubcommand::ByName { name, output } => export
            .export_by_template_name(&name, output.as_deref())
            .await
            .with_context(|| format!("Failed to export with template '{name}'"))?,
        ExportSubcommand::ByUuid { uuid, output } => export
            .export_by_template_uuid(&uuid, output.as_deref())
            .await
            .with_context(|| format!("Failed to export with template {uuid}"))?,
        ExportSubcommand::Create {
            name,
            modules,
            picklists,
            connectors,
            collections,
            output,
        } => {
            let template = build_template(name, modules, picklists, connectors, collections);
            export
                .export(&template, output.as_deref())
                .await
                .context("Failed to export")?
        }
    };

    output::success("Export complete");
    output::field("File", path.display());
    Ok(())
}

fn build_template(
    name: String,
    modules: Vec<String>,
    picklists: Vec<String>,
    connectors: Vec<String>,
    collections: Vec<String>,
) -> SimplifiedTemplate {
    let mut template = SimplifiedTemplate::new(name);
    for module in modules {
        template = template.module(module, &[]);
    }
    for picklist in picklists {
        template = template.picklist(picklist);
    }
    for connector in connectors {
        template = template.connector(connector);
    }
    for collection in collections {
        template = template.playbook_collection(collection);
    }
    template
}
