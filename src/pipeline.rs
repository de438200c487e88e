// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

//! The full benchmarking run: load subject and peers, compute the metric
//! catalog for each, aggregate peers into industry averages, compare, and
//! format insights. Also owns the CSV and markdown exports.

use anyhow::{Context, Result};
use chrono::Local;
use csv::Writer;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write as IoWrite;
use std::path::Path;

use crate::benchmark::{aggregate, BenchmarkValue};
use crate::compare::{compare, ComparisonRecord, Standing};
use crate::config::Config;
use crate::insights::format_insights;
use crate::metrics::{compute_metrics, MetricSet};
use crate::statement::Statement;

/// Everything one analysis run produces. Derived data only; recomputed on
/// every run from the statements on disk.
#[derive(Debug)]
pub struct AnalysisRun {
    pub company_name: String,
    pub subject: Statement,
    pub subject_metrics: MetricSet,
    pub benchmarks: Vec<BenchmarkValue>,
    pub comparisons: Vec<ComparisonRecord>,
    pub insights: Vec<String>,
    pub peers: Vec<Statement>,
    pub peer_count: usize,
}

/// Resolve the peer statement paths from the config's glob pattern.
pub fn resolve_peer_paths(pattern: &str) -> Result<Vec<String>> {
    let mut paths: Vec<String> = glob::glob(pattern)
        .with_context(|| format!("Invalid peer glob pattern: {}", pattern))?
        .filter_map(|entry| entry.ok())
        .map(|p| p.to_string_lossy().to_string())
        .collect();
    paths.sort();
    Ok(paths)
}

/// Run the whole pipeline for one configuration.
///
/// A peer whose file fails to load is reported and skipped; the run
/// continues with the remaining peers. Only a broken subject statement is
/// fatal.
pub fn run_analysis(config: &Config) -> Result<AnalysisRun> {
    let subject = Statement::load(&config.subject_statement).with_context(|| {
        format!(
            "Failed to load subject statement {}",
            config.subject_statement
        )
    })?;
    let subject_metrics = compute_metrics(&subject);

    let peer_paths = resolve_peer_paths(&config.peer_statements)?;
    if peer_paths.is_empty() {
        eprintln!(
            "⚠️  No peer statements match '{}' - benchmarks will be unavailable",
            config.peer_statements
        );
    }

    let progress = ProgressBar::new(peer_paths.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut peers = Vec::new();
    let mut peer_metrics = Vec::new();
    for path in &peer_paths {
        progress.set_message(format!("Loading {}", path));
        match Statement::load(path) {
            Ok(stmt) => {
                peer_metrics.push(compute_metrics(&stmt));
                peers.push(stmt);
            }
            Err(e) => eprintln!("⚠️  Skipping peer {}: {}", path, e),
        }
        progress.inc(1);
    }
    progress.finish_with_message("Peers loaded");

    let benchmarks = aggregate(&peer_metrics);
    let comparisons = compare(&subject_metrics, &benchmarks, config.on_par_tolerance);
    let insights = format_insights(&comparisons);

    Ok(AnalysisRun {
        company_name: config.company_name.clone(),
        subject,
        subject_metrics,
        benchmarks,
        comparisons,
        insights,
        peer_count: peers.len(),
        peers,
    })
}

/// Export the comparison records to a timestamped CSV in the output dir.
/// Returns the filename written.
pub fn export_comparison_csv(run: &AnalysisRun, output_dir: &str) -> Result<String> {
    std::fs::create_dir_all(output_dir)?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("{}/benchmark_{}.csv", output_dir, timestamp);

    let file = File::create(&filename)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record([
        "Metric",
        "Period",
        "Company Value",
        "Industry Average",
        "Difference",
        "Standing",
    ])?;

    for record in &run.comparisons {
        writer.write_record([
            record.metric.clone(),
            record.period.clone(),
            format!("{:.2}", record.subject),
            format!("{:.2}", record.benchmark),
            format!("{:.2}", record.difference),
            record.standing.label().to_string(),
        ])?;
    }

    writer.flush()?;
    println!("✅ Comparison data exported to {}", filename);

    Ok(filename)
}

/// Export the metric table (subject values plus benchmark) with `N/A` for
/// unavailable cells, so partially dirty statements still render.
pub fn export_metric_table_csv(run: &AnalysisRun, output_dir: &str) -> Result<String> {
    std::fs::create_dir_all(output_dir)?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("{}/metrics_{}.csv", output_dir, timestamp);

    let file = File::create(&filename)?;
    let mut writer = Writer::from_writer(file);

    let mut header = vec!["Metric".to_string(), "Category".to_string()];
    header.extend(run.subject_metrics.periods.iter().cloned());
    header.push("Industry Average".to_string());
    writer.write_record(&header)?;

    for series in &run.subject_metrics.series {
        let mut row = vec![series.name.to_string(), series.category.label().to_string()];
        for value in &series.values {
            row.push(
                value
                    .map(|v| format!("{:.2}", v))
                    .unwrap_or_else(|| "N/A".to_string()),
            );
        }
        let benchmark = crate::benchmark::benchmark_value(&run.benchmarks, series.name)
            .and_then(|b| b.value)
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "N/A".to_string());
        row.push(benchmark);
        writer.write_record(&row)?;
    }

    writer.flush()?;
    println!("✅ Metric table exported to {}", filename);

    Ok(filename)
}

/// Export a markdown summary: overview, strongest and weakest metrics, and
/// the full insight list.
pub fn export_summary_report(run: &AnalysisRun, output_dir: &str) -> Result<String> {
    std::fs::create_dir_all(output_dir)?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("{}/benchmark_summary_{}.md", output_dir, timestamp);

    let mut file = File::create(&filename)?;

    writeln!(file, "# Benchmarking Summary: {}", run.company_name)?;
    writeln!(file)?;

    let above = run
        .comparisons
        .iter()
        .filter(|c| c.standing == Standing::Above)
        .count();
    let below = run
        .comparisons
        .iter()
        .filter(|c| c.standing == Standing::Below)
        .count();
    let on_par = run.comparisons.len() - above - below;
    let benchmarked = run.benchmarks.iter().filter(|b| b.value.is_some()).count();

    writeln!(file, "## Overview")?;
    writeln!(file, "- Peers contributing: {}", run.peer_count)?;
    writeln!(
        file,
        "- Metrics with an industry average: {} of {}",
        benchmarked,
        run.benchmarks.len()
    )?;
    writeln!(file, "- Above industry average: {}", above)?;
    writeln!(file, "- Below industry average: {}", below)?;
    writeln!(file, "- On par: {}", on_par)?;
    writeln!(file)?;

    // Rank by signed difference for the strongest/weakest sections.
    let mut ranked: Vec<&ComparisonRecord> = run.comparisons.iter().collect();
    ranked.sort_by(|a, b| b.difference.total_cmp(&a.difference));

    writeln!(file, "## Strongest vs Industry")?;
    for record in ranked.iter().take(5) {
        writeln!(
            file,
            "- **{}** ({}): {:.2} vs {:.2} ({:+.2})",
            record.metric, record.period, record.subject, record.benchmark, record.difference
        )?;
    }
    writeln!(file)?;

    writeln!(file, "## Weakest vs Industry")?;
    for record in ranked.iter().rev().take(5) {
        writeln!(
            file,
            "- **{}** ({}): {:.2} vs {:.2} ({:+.2})",
            record.metric, record.period, record.subject, record.benchmark, record.difference
        )?;
    }
    writeln!(file)?;

    writeln!(file, "## Insights")?;
    for insight in &run.insights {
        writeln!(file, "- {}", insight)?;
    }
    writeln!(file)?;

    writeln!(file, "---")?;
    writeln!(
        file,
        "*Generated on {}*",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;

    println!("✅ Summary report exported to {}", filename);

    Ok(filename)
}

/// Read the subject and peer statements back as raw table text, used as
/// context for the narrative collaborators.
pub fn peer_statement_texts(config: &Config) -> Result<Vec<String>> {
    let mut texts = Vec::new();
    for path in resolve_peer_paths(&config.peer_statements)? {
        if Path::new(&path).exists() {
            match Statement::load(&path) {
                Ok(stmt) => texts.push(stmt.to_table_text()),
                Err(e) => eprintln!("⚠️  Skipping peer {}: {}", path, e),
            }
        }
    }
    Ok(texts)
}
