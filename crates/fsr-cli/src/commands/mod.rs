//! Subcommand implementations.

pub mod alerts;
pub mod check;
pub mod export;
pub mod files;
pub mod packs;

use anyhow::{Context, Result};
use serde_json::Value;

/// Parse a `--data` argument as a JSON object.
fn parse_object(data: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
    anyhow::ensure!(value.is_object(), "--data must be a JSON object");
    Ok(value)
}
