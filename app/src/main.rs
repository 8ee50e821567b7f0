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

mod command;
mod render;

use clap::{Parser, Subcommand};
use command::{
    AnalyzeInput, AnalyzeStrategy, CommandStrategy, InfoStrategy, InitStrategy, ParseInput,
    ParseStrategy, VersionStrategy,
};
use gmpa_core::Step;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "gmpa")]
#[command(about = "GMP assessment analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Step through the analysis of an assessment CSV
    Analyze {
        /// Assessment export with Category, Question, Answer, Score, MaxWeight
        csv: PathBuf,

        /// Stop after this step (1-5 or gaps, drivers, ...)
        #[arg(short, long)]
        until: Option<Step>,

        /// Run every step without prompting
        #[arg(short, long)]
        yes: bool,

        /// Write all results to a JSON file
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
    /// Parse a saved maturity-gap reply into a table
    Parse {
        /// File with the bot reply (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Initialize configuration
    Init,
    /// Show configuration
    Info,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            csv,
            until,
            yes,
            report,
        } => {
            AnalyzeStrategy
                .execute(AnalyzeInput {
                    csv,
                    until,
                    yes,
                    report,
                })
                .await
        }
        Commands::Parse { file, json } => ParseStrategy.execute(ParseInput { file, json }).await,
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
