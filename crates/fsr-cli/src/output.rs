//! Terminal output.
//!
//! Status lines go to stdout with a colored marker; JSON records are printed
//! one per line unless `--pretty` asks for indentation.

use std::fmt::Display;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

pub fn success(msg: impl Display) {
    println!("{} {msg}", "✓".green());
}

/// Report a failure on stderr.
pub fn failure(msg: impl Display) {
    eprintln!("{} {msg}", "✗".red());
}

pub fn field(label: &str, value: impl Display) {
    println!("{}: {value}", label.dimmed());
}

/// Print one JSON value.
pub fn json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    println!("{}", render(value, pretty)?);
    Ok(())
}

/// Print a page of records, one JSON document each.
pub fn records<T: Serialize>(records: &[T], pretty: bool) -> Result<()> {
    for record in records {
        json(record, pretty)?;
    }
    Ok(())
}

fn render<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}
