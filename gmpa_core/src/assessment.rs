//! Assessment CSV intake and bot payload shaping.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::{Error, Result};

/// Columns every assessment export must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = ["Category", "Question", "Answer", "Score", "MaxWeight"];

/// Category excluded from the payload sent to the bots.
pub const EXCLUDED_CATEGORY: &str = "Business";

/// One answered assessment question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRow {
    #[serde(rename = "Category", default)]
    pub category: String,
    #[serde(rename = "Question", default)]
    pub question: String,
    #[serde(rename = "Answer", default)]
    pub answer: String,
    #[serde(rename = "Score", default, deserialize_with = "csv::invalid_option")]
    pub score: Option<f64>,
    #[serde(rename = "MaxWeight", default, deserialize_with = "csv::invalid_option")]
    pub max_weight: Option<f64>,
}

impl AssessmentRow {
    /// Points missing to reach the maximum weight, when both are known.
    #[must_use]
    pub fn point_gap(&self) -> Option<f64> {
        match (self.score, self.max_weight) {
            (Some(score), Some(max)) => Some(max - score),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct PayloadRow<'a> {
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Question")]
    question: &'a str,
    #[serde(rename = "Answer")]
    answer: &'a str,
}

/// The rows of an uploaded assessment, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assessment {
    rows: Vec<AssessmentRow>,
}

impl Assessment {
    #[must_use]
    pub const fn new(rows: Vec<AssessmentRow>) -> Self {
        Self { rows }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading assessment from {}", path.display());
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Read an assessment CSV with a header row.
    ///
    /// Extra columns are ignored; any of [`REQUIRED_COLUMNS`] missing from
    /// the header is an error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|column| !headers.iter().any(|h| h == **column))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            warn!("Assessment CSV is missing columns: {}", missing.join(", "));
            return Err(Error::MissingColumns { missing });
        }

        let rows = rdr
            .deserialize()
            .collect::<std::result::Result<Vec<AssessmentRow>, _>>()?;

        info!("Loaded {} assessment rows", rows.len());
        Ok(Self { rows })
    }

    #[must_use]
    pub fn rows(&self) -> &[AssessmentRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The first `n` rows, for a quick look at what was loaded.
    #[must_use]
    pub fn preview(&self, n: usize) -> &[AssessmentRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Tab-separated `Category`, `Question`, `Answer` table sent to the bots.
    ///
    /// Rows in the [`EXCLUDED_CATEGORY`] are left out.
    pub fn message_payload(&self) -> Result<String> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        let mut written = 0_usize;
        for row in self
            .rows
            .iter()
            .filter(|row| row.category != EXCLUDED_CATEGORY)
        {
            wtr.serialize(PayloadRow {
                category: &row.category,
                question: &row.question,
                answer: &row.answer,
            })?;
            written += 1;
        }

        if written == 0 {
            return Err(Error::EmptyAfterFilter(EXCLUDED_CATEGORY.to_string()));
        }

        let bytes = wtr
            .into_inner()
            .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
        let payload = String::from_utf8(bytes)
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        info!(
            "Built bot payload: {} rows, {} bytes",
            written,
            payload.len()
        );
        Ok(payload)
    }
}
