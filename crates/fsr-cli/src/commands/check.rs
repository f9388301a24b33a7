//! Check command implementation.

use anyhow::Result;
use clap::Args;

use fsr_http::FortiSoar;

use crate::output;

#[derive(Args, Debug)]
pub struct CheckArgs {}

pub async fn run(client: &FortiSoar, _args: CheckArgs) -> Result<()> {
    output::field("Server", client.server());
    output::field("Auth", client.scheme());

    if let Err(err) = client.verify_credentials().await {
        output::failure(format_args!("Credentials rejected: {err}"));
        anyhow::bail!("credential check failed");
    }

    output::success("Credentials accepted");
    Ok(())
}
