//! Step-by-step analysis workflow.
//!
//! The workflow walks an assessment through five steps, strictly in order:
//! category summary, bullet summary, maturity gaps (all three from bots),
//! then maturity drivers and recommendations (computed locally). Results of
//! completed steps stay available until [`Workflow::reset`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::drivers::DEFAULT_DRIVER_LIMIT;
use crate::{
    Assessment, BotClient, BotReply, Catalog, Error, GapRecord, MaturityDriver,
    RecommendationResults, Result, identify_top_maturity_drivers, parse_response,
    run_recommendation_analysis,
};

/// Notice shown when the gap bot's reply contains no recognisable entries.
pub const NO_MATCHING_ENTRIES: &str = "No matching entries found in the maturity gap response.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Start,
    CategorySummary,
    BulletSummary,
    MaturityGaps,
    MaturityDrivers,
    Recommendations,
}

impl Step {
    /// Steps that produce a result, in execution order.
    pub const SEQUENCE: [Self; 5] = [
        Self::CategorySummary,
        Self::BulletSummary,
        Self::MaturityGaps,
        Self::MaturityDrivers,
        Self::Recommendations,
    ];

    /// Position in the workflow, `Start` being 0.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Start => 0,
            Self::CategorySummary => 1,
            Self::BulletSummary => 2,
            Self::MaturityGaps => 3,
            Self::MaturityDrivers => 4,
            Self::Recommendations => 5,
        }
    }

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::CategorySummary),
            Self::CategorySummary => Some(Self::BulletSummary),
            Self::BulletSummary => Some(Self::MaturityGaps),
            Self::MaturityGaps => Some(Self::MaturityDrivers),
            Self::MaturityDrivers => Some(Self::Recommendations),
            Self::Recommendations => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::CategorySummary => "1️⃣ Category Summary",
            Self::BulletSummary => "2️⃣ Bullet Summary",
            Self::MaturityGaps => "3️⃣ Maturity Gaps",
            Self::MaturityDrivers => "4️⃣ Maturity Drivers",
            Self::Recommendations => "5️⃣ Recommendations",
        }
    }

    /// Prompt offered to the user before running this step.
    #[must_use]
    pub const fn action(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::CategorySummary => "1️⃣ Generate Category Summary",
            Self::BulletSummary => "2️⃣ Generate Bullet Summary",
            Self::MaturityGaps => "3️⃣ Identify Maturity Gaps",
            Self::MaturityDrivers => "4️⃣ Identify Maturity Drivers",
            Self::Recommendations => "5️⃣ Run Recommendations Analysis",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "1" | "category_summary" | "summary" => Ok(Self::CategorySummary),
            "2" | "bullet_summary" | "bullets" => Ok(Self::BulletSummary),
            "3" | "maturity_gaps" | "gaps" => Ok(Self::MaturityGaps),
            "4" | "maturity_drivers" | "drivers" => Ok(Self::MaturityDrivers),
            "5" | "recommendations" => Ok(Self::Recommendations),
            other => Err(format!("unknown step: {other}")),
        }
    }
}

/// Progress line for the given position.
///
/// The label at the current step's index, i.e. the step about to run, is bold.
#[must_use]
pub fn breadcrumb(step: Step) -> String {
    let labels: Vec<String> = Step::SEQUENCE
        .iter()
        .enumerate()
        .map(|(i, s)| {
            if i == step.index() {
                format!("**{}**", s.label())
            } else {
                s.label().to_string()
            }
        })
        .collect();
    format!("Progress: {}", labels.join(" ➤ "))
}

/// Bot ids used by the bot-backed steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotRoutes {
    pub category_summary: String,
    pub bullet_summary: String,
    pub maturity_gaps: String,
}

/// Parsed maturity gaps plus the notice to surface when there are none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapOutcome {
    pub records: Vec<GapRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl GapOutcome {
    #[must_use]
    pub fn from_reply(reply: &BotReply) -> Self {
        let records = parse_response(reply.message().unwrap_or_default());
        let notice = if records.is_empty() {
            warn!("{NO_MATCHING_ENTRIES}");
            Some(NO_MATCHING_ENTRIES.to_string())
        } else {
            None
        };
        Self { records, notice }
    }
}

/// Everything produced so far in a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_summary: Option<BotReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bullet_summary: Option<BotReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_gaps: Option<GapOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maturity_drivers: Option<Vec<MaturityDriver>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<RecommendationResults>,
}

pub struct Workflow<B: BotClient> {
    client: B,
    routes: BotRoutes,
    assessment: Assessment,
    payload: String,
    catalog: Catalog,
    driver_limit: usize,
    step: Step,
    results: WorkflowResults,
}

impl<B: BotClient> Workflow<B> {
    /// Prepare a session for `assessment`.
    ///
    /// Fails when nothing is left to send once the excluded category is
    /// filtered out.
    pub fn new(client: B, routes: BotRoutes, assessment: Assessment) -> Result<Self> {
        let payload = assessment.message_payload()?;
        Ok(Self {
            client,
            routes,
            assessment,
            payload,
            catalog: Catalog::default(),
            driver_limit: DEFAULT_DRIVER_LIMIT,
            step: Step::Start,
            results: WorkflowResults::default(),
        })
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    #[must_use]
    pub const fn with_driver_limit(mut self, driver_limit: usize) -> Self {
        self.driver_limit = driver_limit;
        self
    }

    #[must_use]
    pub const fn client(&self) -> &B {
        &self.client
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    #[must_use]
    pub const fn results(&self) -> &WorkflowResults {
        &self.results
    }

    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    #[must_use]
    pub const fn assessment(&self) -> &Assessment {
        &self.assessment
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.step.next().is_none()
    }

    /// Run the next step and return it, or `None` when every step is done.
    ///
    /// On failure the workflow stays where it was, so the step can be retried.
    pub async fn advance(&mut self) -> Result<Option<Step>> {
        let Some(next) = self.step.next() else {
            return Ok(None);
        };

        info!("Running step: {}", next.label());

        match next {
            Step::Start => {}
            Step::CategorySummary => {
                let reply = self.ask(&self.routes.category_summary).await?;
                self.results.category_summary = Some(reply);
            }
            Step::BulletSummary => {
                let reply = self.ask(&self.routes.bullet_summary).await?;
                self.results.bullet_summary = Some(reply);
            }
            Step::MaturityGaps => {
                let reply = self.ask(&self.routes.maturity_gaps).await?;
                self.results.maturity_gaps = Some(GapOutcome::from_reply(&reply));
            }
            Step::MaturityDrivers => {
                self.results.maturity_drivers = Some(identify_top_maturity_drivers(
                    &self.assessment,
                    self.driver_limit,
                ));
            }
            Step::Recommendations => {
                self.results.recommendations =
                    Some(run_recommendation_analysis(&self.assessment, &self.catalog));
            }
        }

        self.step = next;
        Ok(Some(next))
    }

    /// Start over: drop every result and return to the beginning.
    pub fn reset(&mut self) {
        info!("Workflow reset");
        self.step = Step::Start;
        self.results = WorkflowResults::default();
    }

    async fn ask(&self, bot_id: &str) -> Result<BotReply> {
        self.client
            .send_message(bot_id, &self.payload)
            .await
            .map_err(|source| Error::Bot {
                bot: bot_id.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    const GAPS_REPLY: &str = "Here are the gaps:\n1. **Heading**: Lack of automation\n**Context**: Manual steps slow releases\n**Impact**: Higher error rate";

    const CSV: &str = "\
Category,Question,Answer,Score,MaxWeight
Business,Budget?,Large,3,5
Measurement,Is attribution in place?,No,1,5
";

    #[derive(Default)]
    struct ScriptedBot {
        calls: Mutex<Vec<(String, String)>>,
        gaps_reply: Option<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl BotClient for ScriptedBot {
        async fn send_message(&self, bot_id: &str, message: &str) -> anyhow::Result<BotReply> {
            self.calls
                .lock()
                .unwrap()
                .push((bot_id.to_string(), message.to_string()));
            if self.fail {
                anyhow::bail!("connection refused");
            }
            let text = match bot_id {
                "gaps" => self.gaps_reply.unwrap_or(GAPS_REPLY),
                other => other,
            };
            Ok(BotReply::new(json!({ "message": text })))
        }
    }

    fn routes() -> BotRoutes {
        BotRoutes {
            category_summary: "summary".to_string(),
            bullet_summary: "bullets".to_string(),
            maturity_gaps: "gaps".to_string(),
        }
    }

    fn workflow(bot: ScriptedBot) -> Workflow<ScriptedBot> {
        let assessment = Assessment::from_reader(CSV.as_bytes()).unwrap();
        Workflow::new(bot, routes(), assessment).unwrap()
    }

    #[tokio::test]
    async fn runs_every_step_in_order() {
        let mut wf = workflow(ScriptedBot::default());
        let mut seen = Vec::new();
        while let Some(step) = wf.advance().await.unwrap() {
            seen.push(step);
        }
        assert_eq!(seen, Step::SEQUENCE);
        assert!(wf.is_finished());
        assert_eq!(wf.advance().await.unwrap(), None);

        let results = wf.results();
        assert_eq!(
            results.category_summary.as_ref().unwrap().message(),
            Some("summary")
        );
        assert_eq!(
            results.bullet_summary.as_ref().unwrap().message(),
            Some("bullets")
        );
        let gaps = results.maturity_gaps.as_ref().unwrap();
        assert_eq!(gaps.records.len(), 1);
        assert_eq!(gaps.records[0].heading, "Lack of automation");
        assert_eq!(gaps.notice, None);
        assert_eq!(results.maturity_drivers.as_ref().unwrap().len(), 2);
        assert!(results.recommendations.as_ref().unwrap().total_matched_recommendations > 0);

        let calls = wf.client.calls.lock().unwrap();
        let bots: Vec<&str> = calls.iter().map(|(bot, _)| bot.as_str()).collect();
        assert_eq!(bots, ["summary", "bullets", "gaps"]);
        assert!(calls.iter().all(|(_, payload)| !payload.contains("Business")));
    }

    #[tokio::test]
    async fn empty_gap_reply_sets_notice_and_continues() {
        let mut wf = workflow(ScriptedBot {
            gaps_reply: Some("no list here"),
            ..ScriptedBot::default()
        });
        for _ in 0..3 {
            wf.advance().await.unwrap();
        }
        let gaps = wf.results().maturity_gaps.as_ref().unwrap();
        assert!(gaps.records.is_empty());
        assert_eq!(gaps.notice.as_deref(), Some(NO_MATCHING_ENTRIES));

        assert_eq!(wf.advance().await.unwrap(), Some(Step::MaturityDrivers));
    }

    #[tokio::test]
    async fn failed_call_keeps_position() {
        let mut wf = workflow(ScriptedBot {
            fail: true,
            ..ScriptedBot::default()
        });
        let err = wf.advance().await.unwrap_err();
        assert!(matches!(err, Error::Bot { ref bot, .. } if bot == "summary"));
        assert_eq!(wf.step(), Step::Start);
        assert!(wf.results().category_summary.is_none());
    }

    #[tokio::test]
    async fn reset_starts_over() {
        let mut wf = workflow(ScriptedBot::default());
        wf.advance().await.unwrap();
        wf.advance().await.unwrap();
        wf.reset();
        assert_eq!(wf.step(), Step::Start);
        assert_eq!(wf.results(), &WorkflowResults::default());
        assert_eq!(wf.advance().await.unwrap(), Some(Step::CategorySummary));
    }

    #[test]
    fn business_only_assessment_is_rejected() {
        let csv = "Category,Question,Answer,Score,MaxWeight\nBusiness,Q,A,1,2\n";
        let assessment = Assessment::from_reader(csv.as_bytes()).unwrap();
        assert!(matches!(
            Workflow::new(ScriptedBot::default(), routes(), assessment),
            Err(Error::EmptyAfterFilter(_))
        ));
    }

    #[test]
    fn breadcrumb_bolds_the_upcoming_step() {
        assert_eq!(
            breadcrumb(Step::Start),
            "Progress: **1️⃣ Category Summary** ➤ 2️⃣ Bullet Summary ➤ 3️⃣ Maturity Gaps ➤ 4️⃣ Maturity Drivers ➤ 5️⃣ Recommendations"
        );
        assert!(breadcrumb(Step::MaturityGaps).contains("**4️⃣ Maturity Drivers**"));
        assert!(!breadcrumb(Step::Recommendations).contains("**"));
    }

    #[test]
    fn steps_parse_from_names_and_numbers() {
        assert_eq!("gaps".parse::<Step>(), Ok(Step::MaturityGaps));
        assert_eq!("maturity-drivers".parse::<Step>(), Ok(Step::MaturityDrivers));
        assert_eq!("5".parse::<Step>(), Ok(Step::Recommendations));
        assert!("start".parse::<Step>().is_err());
    }
}
