// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};

use finbench::charts;
use finbench::chat;
use finbench::config::Config;
use finbench::metrics::CATALOG;
use finbench::narrative::{MemoryCache, NarrativeClient};
use finbench::pipeline::{
    self, export_comparison_csv, export_metric_table_csv, export_summary_report, run_analysis,
};
use finbench::web::{server, AppState};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the benchmarking pipeline and export CSV and markdown reports
    Analyze,
    /// List every metric in the catalog with its category and inputs
    ListMetrics,
    /// Generate trend charts from the latest analysis
    GenerateCharts,
    /// Fetch a market landscape report for the configured company
    MarketReport,
    /// Produce the full narrative bundle: market, industry, and standing
    Report,
    /// Ask the report writer one question, grounded in the current insights
    Chat {
        /// The question to ask
        question: String,
    },
    /// Start the web dashboard
    Serve {
        /// Port to bind to
        #[arg(long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::default();

    match cli.command {
        Some(Commands::ListMetrics) => {
            for def in CATALOG {
                println!(
                    "{:<28} [{}] inputs: {}",
                    def.name,
                    def.category.label(),
                    def.inputs.join(", ")
                );
            }
        }
        Some(Commands::GenerateCharts) => {
            let run = run_analysis(&config)?;
            let written = charts::generate_all_charts(&run, &config.output_dir)?;
            println!("✅ {} chart(s) generated", written.len());
        }
        Some(Commands::MarketReport) => {
            let client = narrative_client()?;
            let report = client.market_report(&config.company_name).await?;
            let path = write_report(&config, "market_report", &report)?;
            println!("✅ Market report saved to {}", path);
        }
        Some(Commands::Report) => {
            let client = narrative_client()?;
            let run = run_analysis(&config)?;

            let market = client.market_report(&config.company_name).await?;
            let peer_texts = pipeline::peer_statement_texts(&config)?;
            let industry = client
                .industry_report(&config.company_name, &peer_texts)
                .await?;
            let standing = client
                .standing_analysis(
                    &config.company_name,
                    &run.subject.to_table_text(),
                    &industry,
                    &market,
                )
                .await?;

            let bundle = format!(
                "# Financial Analysis: {}\n\n## Market Landscape\n\n{}\n\n## Industry Comparison\n\n{}\n\n## Standing\n\n{}\n",
                config.company_name, market, industry, standing
            );
            let path = write_report(&config, "analysis_report", &bundle)?;
            println!("✅ Analysis report saved to {}", path);
        }
        Some(Commands::Chat { question }) => {
            let client = narrative_client()?;
            let run = run_analysis(&config)?;
            let answer =
                chat::chatbot_response(&client, &config.company_name, &question, &run.insights)
                    .await?;
            println!("{}", answer);
        }
        Some(Commands::Serve { port }) => {
            let run = run_analysis(&config)?;
            let narrative = match narrative_client() {
                Ok(client) => Some(client),
                Err(e) => {
                    eprintln!("⚠️  Chat disabled: {}", e);
                    None
                }
            };
            let state = AppState::new(config, run, narrative);
            server::start_server(state, port).await?;
        }
        Some(Commands::Analyze) | None => {
            let run = run_analysis(&config)?;
            export_comparison_csv(&run, &config.output_dir)?;
            export_metric_table_csv(&run, &config.output_dir)?;
            export_summary_report(&run, &config.output_dir)?;
            println!(
                "✅ {} compared against {} peer(s): {} comparison record(s)",
                run.company_name,
                run.peer_count,
                run.comparisons.len()
            );
        }
    }

    Ok(())
}

fn narrative_client() -> Result<NarrativeClient> {
    NarrativeClient::from_env(Box::new(MemoryCache::new()))
        .context("Narrative features need GROQ_API_KEY and PERPLEXITY_API_KEY")
}

fn write_report(config: &Config, stem: &str, content: &str) -> Result<String> {
    std::fs::create_dir_all(&config.output_dir)?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = format!("{}/{}_{}.md", config.output_dir, stem, timestamp);
    std::fs::write(&path, content)?;
    Ok(path)
}
