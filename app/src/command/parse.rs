//! Offline parsing of a saved maturity-gap reply.

use anyhow::Context;
use gmpa_core::{NO_MATCHING_ENTRIES, parse_response};
use std::io::Read;
use std::path::PathBuf;
use tracing::warn;

use crate::render;

/// Input parameters for the Parse command strategy.
#[derive(Debug, Clone)]
pub struct ParseInput {
    /// File holding the bot reply; stdin when absent
    pub file: Option<PathBuf>,
    /// Print records as JSON instead of a table
    pub json: bool,
}

/// Strategy for turning a saved bot reply into the gap table.
#[derive(Debug, Clone, Copy)]
pub struct ParseStrategy;

impl super::CommandStrategy for ParseStrategy {
    type Input = ParseInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let text = match &input.file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read {}", path.display()))?,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };

        print!("{}", report(&text, input.json)?);
        Ok(())
    }
}

/// Render the gap records found in `text` for stdout.
///
/// The no-entries notice is always logged; in table mode it is also the
/// output, while JSON mode keeps stdout parseable.
fn report(text: &str, json: bool) -> anyhow::Result<String> {
    let records = parse_response(text);

    if records.is_empty() {
        warn!("{NO_MATCHING_ENTRIES}");
    }

    let output = if json {
        serde_json::to_string_pretty(&records)?
    } else if records.is_empty() {
        format!("⚠️ {NO_MATCHING_ENTRIES}")
    } else {
        render::gap_table(&records).to_string()
    };

    Ok(format!("{}\n", output.trim_end()))
}
