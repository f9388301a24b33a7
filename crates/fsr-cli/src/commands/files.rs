//! File upload commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use fsr_http::FortiSoar;

use crate::output;

#[derive(Args, Debug)]
pub struct FilesCommand {
    #[command(subcommand)]
    pub command: FilesSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum FilesSubcommand {
    /// Upload a file, optionally wrapping it in an attachment record
    Upload {
        path: PathBuf,

        /// Also create an attachment for the uploaded file
        #[arg(long)]
        attach: bool,

        /// Attachment description (implies --attach)
        #[arg(long)]
        description: Option<String>,
    },
}

pub async fn handle(client: &FortiSoar, cmd: FilesCommand) -> Result<()> {
    match cmd.command {
        FilesSubcommand::Upload {
            path,
            attach,
            description,
        } => {
            let record = if attach || description.is_some() {
                client
                    .files()
                    .upload_attachment(&path, description.as_deref())
                    .await
                    .context("Failed to create attachment")?
            } else {
                client
                    .files()
                    .upload(&path)
                    .await
                    .context("Failed to upload file")?
            };

            output::success(format_args!("Uploaded {}", path.display()));
            if let Some(iri) = record.get("@id").and_then(|v| v.as_str()) {
                output::field("IRI", iri);
            }
        }
    }

    Ok(())
}
