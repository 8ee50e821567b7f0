//! Capability recommendations matched against assessment answers.
//!
//! A [`Catalog`] maps categories (and optionally question keywords) to
//! recommendations. The built-in catalog can be replaced by a JSON file with
//! the same shape as [`Recommendation`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::{Assessment, AssessmentRow, Result};

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Assessment category this entry applies to (case-insensitive).
    pub category: String,

    /// Keyword the question must contain (case-insensitive). Matches every
    /// question of the category when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,

    pub recommendation: String,
    pub overview: String,
    pub gmp_impact: String,
    pub business_impact: String,
}

impl Recommendation {
    fn matches(&self, row: &AssessmentRow) -> bool {
        if !self.category.eq_ignore_ascii_case(row.category.trim()) {
            return false;
        }
        self.question.as_ref().is_none_or(|keyword| {
            row.question
                .to_lowercase()
                .contains(&keyword.to_lowercase())
        })
    }
}

/// A catalog entry together with the answer that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedRecommendation {
    pub recommendation: String,
    pub overview: String,
    pub gmp_impact: String,
    pub business_impact: String,
    pub category: String,
    pub question: String,
    pub score: f64,
    pub maxweight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResults {
    pub matched_recommendations: Vec<MatchedRecommendation>,
    pub total_matched_recommendations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<Recommendation>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(default_recommendations())
    }
}

impl Catalog {
    #[must_use]
    pub const fn new(entries: Vec<Recommendation>) -> Self {
        Self { entries }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading recommendation catalog from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    #[must_use]
    pub fn entries(&self) -> &[Recommendation] {
        &self.entries
    }
}

/// Match the catalog against every answer that is short of its maximum weight.
///
/// Each catalog entry is reported at most once, for the first answer (in file
/// order) that triggers it. Results follow catalog order.
#[must_use]
pub fn run_recommendation_analysis(
    assessment: &Assessment,
    catalog: &Catalog,
) -> RecommendationResults {
    let scored_gaps: Vec<(&AssessmentRow, f64, f64)> = assessment
        .rows()
        .iter()
        .filter_map(|row| {
            let (score, max) = (row.score?, row.max_weight?);
            (max - score > 0.0).then_some((row, score, max))
        })
        .collect();

    let matched_recommendations: Vec<MatchedRecommendation> = catalog
        .entries()
        .iter()
        .filter_map(|entry| {
            let (row, score, maxweight) = scored_gaps
                .iter()
                .find(|(row, _, _)| entry.matches(row))?;
            debug!(
                "Recommendation '{}' matched question '{}'",
                entry.recommendation, row.question
            );
            Some(MatchedRecommendation {
                recommendation: entry.recommendation.clone(),
                overview: entry.overview.clone(),
                gmp_impact: entry.gmp_impact.clone(),
                business_impact: entry.business_impact.clone(),
                category: row.category.clone(),
                question: row.question.clone(),
                score: *score,
                maxweight: *maxweight,
            })
        })
        .collect();

    let total_matched_recommendations = matched_recommendations.len();
    info!("Matched {total_matched_recommendations} recommendations");

    RecommendationResults {
        matched_recommendations,
        total_matched_recommendations,
    }
}

fn entry(
    category: &str,
    question: Option<&str>,
    recommendation: &str,
    overview: &str,
    gmp_impact: &str,
    business_impact: &str,
) -> Recommendation {
    Recommendation {
        category: category.to_string(),
        question: question.map(ToString::to_string),
        recommendation: recommendation.to_string(),
        overview: overview.to_string(),
        gmp_impact: gmp_impact.to_string(),
        business_impact: business_impact.to_string(),
    }
}

/// Built-in catalog used when no catalog file is configured.
#[must_use]
pub fn default_recommendations() -> Vec<Recommendation> {
    vec![
        entry(
            "Data",
            Some("first-party"),
            "First-party data foundation",
            "Consolidate first-party data into a governed customer data store feeding the platform.",
            "Unlocks audience building and customer match across GMP products.",
            "Better targeting lowers acquisition cost.",
        ),
        entry(
            "Data",
            None,
            "Data integration roadmap",
            "Connect CRM, web analytics and media data through scheduled, monitored pipelines.",
            "Shared datasets become available to Analytics, DV360 and Search Ads 360.",
            "Fewer manual exports and faster reporting cycles.",
        ),
        entry(
            "Measurement",
            Some("attribution"),
            "Data-driven attribution",
            "Move from last-click to data-driven attribution and align conversion definitions.",
            "Bidding strategies optimise on a complete view of the conversion path.",
            "Budget shifts toward channels that actually drive revenue.",
        ),
        entry(
            "Measurement",
            None,
            "Measurement framework",
            "Agree KPIs per funnel stage and implement consistent tagging with a tag manager.",
            "Reliable conversion data across all GMP reporting surfaces.",
            "Decisions rely on one trusted set of numbers.",
        ),
        entry(
            "Activation",
            Some("automat"),
            "Automated bidding and campaign workflows",
            "Adopt automated bidding and rules-based trafficking for recurring campaigns.",
            "Higher utilisation of DV360 and SA360 automation features.",
            "Teams spend time on strategy instead of manual operations.",
        ),
        entry(
            "Activation",
            None,
            "Audience activation playbook",
            "Define reusable audience segments and push them consistently to every buying platform.",
            "Audiences are shared across products instead of rebuilt per campaign.",
            "More relevant messaging improves conversion rates.",
        ),
        entry(
            "Technology",
            None,
            "Platform integration review",
            "Audit product linking, permissions and API usage across the GMP stack.",
            "Linked products exchange data without manual steps.",
            "Lower operating cost for the marketing technology stack.",
        ),
        entry(
            "Organization",
            None,
            "Center of excellence",
            "Set up a cross-functional team owning platform standards, training and governance.",
            "Consistent, expert use of GMP features across teams.",
            "Knowledge stays in-house and scales with the business.",
        ),
    ]
}
