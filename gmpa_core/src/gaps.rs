//! Maturity-gap extraction from free-text bot replies.
//!
//! The gap bot answers with a numbered list in a loose markdown convention:
//!
//! ```text
//! 1. **Heading**: <heading text>
//! **Context**: <context text>
//! **Impact**: <impact text>
//! ```
//!
//! The patterns below are the whole contract with the bot. Callers only see
//! [`parse_response`] and [`GapRecord`], so the convention can change here
//! without touching them.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

/// Placeholder for a field whose marker was not found.
pub const NOT_AVAILABLE: &str = "N/A";

/// Start of an entry: newline, list number, period, whitespace, bold `Heading:`.
static ENTRY_BOUNDARY: OnceLock<Regex> = OnceLock::new();
static HEADING: OnceLock<Regex> = OnceLock::new();
static CONTEXT: OnceLock<Regex> = OnceLock::new();
static IMPACT: OnceLock<Regex> = OnceLock::new();

#[expect(
    clippy::expect_used,
    reason = "Static regex patterns are guaranteed to be valid"
)]
fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("Static regex pattern is guaranteed to be valid"))
}

// Markers accept both `**Name**:` and `**Name:**`.
fn entry_boundary() -> &'static Regex {
    compiled(
        &ENTRY_BOUNDARY,
        r"\n\d+\.\s+\*\*Heading(?:\*\*:|:\*\*)",
    )
}

fn heading_pattern() -> &'static Regex {
    compiled(&HEADING, r"(?s)\A(.*?)\*\*Context(?:\*\*:|:\*\*)")
}

fn context_pattern() -> &'static Regex {
    compiled(
        &CONTEXT,
        r"(?s)\*\*Context(?:\*\*:|:\*\*)(.*?)(?:\*\*Impact(?:\*\*:|:\*\*)|\z)",
    )
}

fn impact_pattern() -> &'static Regex {
    compiled(&IMPACT, r"(?s)\*\*Impact(?:\*\*:|:\*\*)(.*)\z")
}

/// One maturity gap reported by the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapRecord {
    pub heading: String,
    pub context: String,
    pub impact: String,
}

impl GapRecord {
    /// Whether every field was found in the source text.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.heading, &self.context, &self.impact]
            .iter()
            .all(|field| field.as_str() != NOT_AVAILABLE)
    }

    fn from_segment(segment: &str) -> Self {
        Self {
            heading: capture(heading_pattern(), segment),
            context: capture(context_pattern(), segment),
            impact: capture(impact_pattern(), segment),
        }
    }
}

fn capture(pattern: &Regex, segment: &str) -> String {
    pattern
        .captures(segment)
        .and_then(|caps| caps.get(1))
        .map_or_else(
            || NOT_AVAILABLE.to_string(),
            |m| m.as_str().trim().to_string(),
        )
}

/// Parse a bot reply into gap records, in order of appearance.
///
/// Text before the first entry boundary is preamble and is dropped. An entry
/// missing any of its markers still yields a record, with [`NOT_AVAILABLE`]
/// in the unmatched fields. Without an `Impact` marker the context runs to
/// the end of the entry. Returns an empty vector when no boundary is found.
#[must_use]
pub fn parse_response(response_text: &str) -> Vec<GapRecord> {
    let records: Vec<GapRecord> = entry_boundary()
        .split(response_text)
        .skip(1)
        .map(GapRecord::from_segment)
        .collect();

    debug!(
        "Parsed {} gap entries from {} chars",
        records.len(),
        response_text.len()
    );

    records
}
