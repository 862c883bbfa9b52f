//! Decision validation command implementation.

use crate::config::{Config, OutputFormat};
use crate::decision::parse_decision;
use crate::format::Formatter;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

/// Validates a model response read from a file (or stdin for `-`) and
/// returns the bounded decision payload.
pub fn run(config: &Config, input: &str) -> Result<String> {
    let raw = if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read model response from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(Path::new(input))
            .with_context(|| format!("Failed to read model response from {}", input))?
    };

    Ok(render(config.format, &raw))
}

/// Parses and formats a raw response string.
pub fn render(format: OutputFormat, raw: &str) -> String {
    let payload = parse_decision(raw);
    Formatter::new(format).format_decision(&payload)
}
