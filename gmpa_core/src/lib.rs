#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod assessment;
pub mod drivers;
pub mod error;
pub mod gaps;
pub mod recommendations;
pub mod workflow;

pub use assessment::{Assessment, AssessmentRow, REQUIRED_COLUMNS};
pub use drivers::{DEFAULT_DRIVER_LIMIT, MaturityDriver, identify_top_maturity_drivers};
pub use error::{Error, Result};
pub use gaps::{GapRecord, NOT_AVAILABLE, parse_response};
pub use recommendations::{
    Catalog, MatchedRecommendation, Recommendation, RecommendationResults,
    run_recommendation_analysis,
};
pub use workflow::{
    BotRoutes, GapOutcome, NO_MATCHING_ENTRIES, Step, Workflow, WorkflowResults, breadcrumb,
};

/// JSON body returned by a bot endpoint.
///
/// Bots normally answer with a `message` string; anything else is kept
/// verbatim so it can still be shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct BotReply {
    pub raw: serde_json::Value,
}

impl BotReply {
    #[must_use]
    pub const fn new(raw: serde_json::Value) -> Self {
        Self { raw }
    }

    /// The `message` field, if the bot sent one.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.raw.get("message").and_then(serde_json::Value::as_str)
    }

    /// Message text, or the pretty-printed JSON body when there is none.
    #[must_use]
    pub fn display_text(&self) -> String {
        self.message().map_or_else(
            || serde_json::to_string_pretty(&self.raw).unwrap_or_else(|_| self.raw.to_string()),
            ToString::to_string,
        )
    }
}

/// A remotely hosted chat bot addressed by id.
#[async_trait]
pub trait BotClient: Send + Sync {
    async fn send_message(&self, bot_id: &str, message: &str) -> anyhow::Result<BotReply>;
}

#[async_trait]
impl<T: BotClient + ?Sized> BotClient for std::sync::Arc<T> {
    async fn send_message(&self, bot_id: &str, message: &str) -> anyhow::Result<BotReply> {
        (**self).send_message(bot_id, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_prefers_message_field() {
        let reply = BotReply::new(json!({"message": "hello", "id": 3}));
        assert_eq!(reply.message(), Some("hello"));
        assert_eq!(reply.display_text(), "hello");
    }

    #[test]
    fn reply_without_message_falls_back_to_json() {
        let reply = BotReply::new(json!({"status": "queued"}));
        assert_eq!(reply.message(), None);
        assert!(reply.display_text().contains("\"status\": \"queued\""));
    }
}
