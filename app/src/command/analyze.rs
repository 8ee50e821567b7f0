//! Step-through analysis of an assessment CSV.

use anyhow::Context;
use gmpa_config::Config;
use gmpa_core::{Assessment, BotClient, Catalog, Step, Workflow, breadcrumb};
use gmpa_providers::{InteractClient, InteractCredentials};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::render;

/// Input parameters for the Analyze command strategy.
#[derive(Debug, Clone)]
pub struct AnalyzeInput {
    /// Assessment CSV to analyze
    pub csv: PathBuf,
    /// Stop after this step
    pub until: Option<Step>,
    /// Run every step without prompting
    pub yes: bool,
    /// Write collected results to this JSON file
    pub report: Option<PathBuf>,
}

/// What the user chose at a step prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Continue,
    StartOver,
    Quit,
}

impl Choice {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "" | "y" | "yes" => Some(Self::Continue),
            "r" | "restart" => Some(Self::StartOver),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Strategy for executing the Analyze command.
///
/// Loads and validates the CSV, shows a preview, then walks the workflow one
/// step at a time, rendering each result as it arrives.
#[derive(Debug, Clone, Copy)]
pub struct AnalyzeStrategy;

impl super::CommandStrategy for AnalyzeStrategy {
    type Input = AnalyzeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        config.ensure_credentials()?;

        println!("GMP Assessment Analysis");
        println!(
            "The current date is: {}\n",
            chrono::Local::now().format("%Y-%m-%d")
        );

        let assessment = Assessment::from_path(&input.csv)
            .with_context(|| format!("Error processing {}", input.csv.display()))?;
        println!("CSV file successfully loaded! See sample below.");
        render::assessment_preview(assessment.preview(config.analysis.preview_rows)).printstd();

        let catalog = match &config.analysis.catalog_path {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::default(),
        };

        let client = InteractClient::new(
            config.interact.base_url(),
            InteractCredentials {
                client_id: config.interact.client_id.clone(),
                client_secret: config.interact.client_secret.clone(),
                application_id: config.interact.application_id.clone(),
            },
        )
        .with_token_path(config.interact.token_path.clone());

        let mut workflow = Workflow::new(client, config.bots.clone(), assessment)?
            .with_catalog(catalog)
            .with_driver_limit(config.analysis.driver_limit);

        run_steps(&mut workflow, &input, prompt).await?;

        if let Some(path) = &input.report {
            let json = serde_json::to_string_pretty(workflow.results())?;
            std::fs::write(path, json)
                .with_context(|| format!("Cannot write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
            println!("\n📄 Report written to {}", path.display());
        }

        Ok(())
    }
}

/// Drive `workflow` until it finishes, reaches `input.until` or the user quits.
///
/// `ask` is consulted before each step unless `input.yes` is set.
async fn run_steps<B, P>(
    workflow: &mut Workflow<B>,
    input: &AnalyzeInput,
    mut ask: P,
) -> anyhow::Result<()>
where
    B: BotClient,
    P: FnMut(Step, bool) -> anyhow::Result<Choice>,
{
    loop {
        let current = workflow.step();
        let Some(next) = current.next() else {
            break;
        };
        if input.until.is_some_and(|until| current >= until) {
            info!("Stopping after {}", current.label());
            break;
        }

        println!("\n{}", breadcrumb(current));

        if !input.yes {
            match ask(next, current != Step::Start)? {
                Choice::Continue => {}
                Choice::StartOver => {
                    workflow.reset();
                    println!("🔄 Starting over");
                    continue;
                }
                Choice::Quit => break,
            }
        }

        match workflow.advance().await {
            Ok(Some(step)) => render::print_step(step, workflow.results()),
            Ok(None) => break,
            // Unattended runs stop on the first failure; interactive ones may retry.
            Err(e) if input.yes => return Err(e.into()),
            Err(e) => {
                warn!("{} failed: {e}", next.label());
                eprintln!("❌ {e}");
            }
        }
    }

    if workflow.is_finished() {
        println!("\n{}", breadcrumb(workflow.step()));
    }
    Ok(())
}

fn prompt(next: Step, can_restart: bool) -> anyhow::Result<Choice> {
    loop {
        if can_restart {
            print!("{} [Enter = run, r = start over, q = quit] > ", next.action());
        } else {
            print!("{} [Enter = run, q = quit] > ", next.action());
        }
        std::io::stdout().flush()?;

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            return Ok(Choice::Quit);
        }

        match Choice::parse(&line) {
            Some(Choice::StartOver) if !can_restart => {}
            Some(choice) => return Ok(choice),
            None => println!("Unrecognised choice: {}", line.trim()),
        }
    }
}
