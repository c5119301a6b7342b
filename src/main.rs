use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use log::info;

mod config;
mod dataset;
mod error;
mod features;
mod feedback;
mod history;
mod llm;
mod models;
mod orchestrator;
mod plot;
mod prompt;
mod report;
mod risk;
mod summary;

use config::{ChatSettings, ColumnNames, ForestSettings, Settings};
use dataset::Dataset;
use error::CopilotError;
use history::HistoryStore;
use orchestrator::Orchestrator;

#[derive(Parser)]
#[command(name = "sales-copilot")]
#[command(about = "Sales CSV analysis with an underperformance risk signal and an AI summary", long_about = None)]
struct Cli {
    /// Labeled history used to train the risk model
    #[arg(long, global = true, env = "SALES_COPILOT_HISTORY", default_value = "history.csv")]
    history: PathBuf,
    #[arg(long, global = true, default_value = "ca")]
    revenue_column: String,
    #[arg(long, global = true, default_value = "quantite")]
    quantity_column: String,
    #[arg(long, global = true, default_value_t = 100)]
    trees: usize,
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[arg(long, global = true, env = "GROQ_API_URL", default_value = config::DEFAULT_API_URL)]
    api_url: String,
    #[arg(long, global = true, env = "GROQ_MODEL", default_value = config::DEFAULT_MODEL)]
    model: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a sales file, summarize it and ask the model for a narrative
    Analyze {
        #[arg(long)]
        csv: PathBuf,
        /// Column for the scatter plot's horizontal axis
        #[arg(long, requires = "y")]
        x: Option<String>,
        /// Column for the scatter plot's vertical axis
        #[arg(long, requires = "x")]
        y: Option<String>,
        /// Record whether this dataset is risky (oui/non) after the analysis
        #[arg(long, action = ArgAction::Set, value_parser = feedback::parse_label)]
        label: Option<bool>,
        /// Write a markdown report
        #[arg(long)]
        report: Option<PathBuf>,
        /// Do not call the chat completion endpoint
        #[arg(long)]
        skip_llm: bool,
    },
    /// Label a previously analyzed sales file
    Label {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, action = ArgAction::Set, value_parser = feedback::parse_label)]
        risky: bool,
    },
    /// List the labeled history
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let chat = ChatSettings::from_env(cli.api_url, cli.model)
        .context("an API key is required before any analysis can run")?;

    let settings = Settings {
        history_path: cli.history,
        columns: ColumnNames {
            revenue: cli.revenue_column,
            quantity: cli.quantity_column,
        },
        forest: ForestSettings {
            n_trees: cli.trees,
            seed: cli.seed,
        },
    };
    let store = HistoryStore::new(&settings.history_path);

    match cli.command {
        Commands::Analyze {
            csv,
            x,
            y,
            label,
            report,
            skip_llm,
        } => {
            let dataset = Dataset::from_path(&csv)
                .with_context(|| format!("failed to read {}", csv.display()))?;
            let orchestrator = Orchestrator::new(&store, &settings);
            let mut analysis = orchestrator.assess(&dataset)?;

            let observation = &analysis.observation;
            println!(
                "Dataset: revenue {:.2}, quantity {:.2}, {} rows",
                observation.total_revenue, observation.total_quantity, observation.row_count
            );
            if analysis.assessment.is_scored() {
                println!(
                    "Underperformance risk: {} (from {} labeled observations)",
                    analysis.assessment, analysis.history_rows
                );
            } else {
                println!("Underperformance risk: {}", analysis.assessment);
            }

            let summaries = summary::describe(&dataset);
            let summary_text = summary::render(&summaries);
            println!();
            println!("Summary:");
            print!("{summary_text}");

            if let (Some(x), Some(y)) = (x.as_deref(), y.as_deref()) {
                let (xs, ys) = dataset
                    .numeric_pairs(x, y)?
                    .with_context(|| format!("columns `{x}` and `{y}` must both exist"))?;
                println!();
                print!(
                    "{}",
                    plot::render_scatter(x, y, &xs, &ys, plot::DEFAULT_WIDTH, plot::DEFAULT_HEIGHT)?
                );
            }

            let narrative = if skip_llm {
                None
            } else {
                let client = llm::ChatClient::new(chat);
                let user_prompt = prompt::build_user_prompt(&summary_text, &analysis.assessment);
                match client.complete(prompt::SYSTEM_MESSAGE, &user_prompt).await {
                    Ok(text) => {
                        println!();
                        println!("AI summary:");
                        println!("{text}");
                        Some(text)
                    }
                    Err(CopilotError::RemoteService { status, payload }) => {
                        println!();
                        println!("API error ({status}):");
                        println!("{payload}");
                        None
                    }
                    Err(err) => return Err(err.into()),
                }
            };

            if let Some(out) = report {
                let source = csv.display().to_string();
                let content = report::build_report(
                    &source,
                    chrono::Utc::now(),
                    &summaries,
                    &analysis,
                    narrative.as_deref(),
                );
                std::fs::write(&out, content)?;
                println!("Report written to {}.", out.display());
            }

            if let Some(is_risky) = label {
                let table = orchestrator.submit_feedback(&mut analysis, is_risky)?;
                println!(
                    "Label saved; {} now holds {} rows.",
                    store.path().display(),
                    table.len()
                );
            }
            info!("analysis finished at stage {:?}", analysis.stage());
        }
        Commands::Label { csv, risky } => {
            let dataset = Dataset::from_path(&csv)
                .with_context(|| format!("failed to read {}", csv.display()))?;
            let observation = features::extract(&dataset, &settings.columns)?;
            let table = store.load()?;
            let table = feedback::submit(&store, &table, observation, risky)?;
            println!(
                "Label saved; {} now holds {} rows.",
                store.path().display(),
                table.len()
            );
        }
        Commands::History { limit } => {
            let table = store.load()?;

            if table.is_empty() {
                println!("No labeled observations in {}.", store.path().display());
                return Ok(());
            }

            let risky = table.iter().filter(|row| row.is_risky).count();
            println!(
                "{} labeled observations ({} risky), most recent first:",
                table.len(),
                risky
            );
            for row in table.iter().rev().take(limit) {
                println!(
                    "- revenue {:.2}, quantity {:.2}, {} rows: {}",
                    row.total_revenue,
                    row.total_quantity,
                    row.row_count,
                    if row.is_risky { "risky" } else { "not risky" }
                );
            }
        }
    }

    Ok(())
}
