// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

//! Common test utilities and helpers
//!
//! This module provides reusable test infrastructure for the integration
//! tests:
//! - Statement CSV generation in a temp directory
//! - A ready-made config pointing at that directory
//! - A builder for simple income-statement fixtures

use anyhow::Result;
use std::fs::File;
use std::io::Write;
use tempfile::TempDir;

use finbench::config::Config;

/// Writes a statement CSV into the temp dir and returns its path.
pub fn write_statement(dir: &TempDir, name: &str, content: &str) -> Result<String> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    Ok(path.to_string_lossy().to_string())
}

/// A statement with quarterly Total Income and Gross Profit rows, enough to
/// drive the margin metrics.
pub fn margin_statement(income: &[f64], gross_profit: &[f64]) -> String {
    assert_eq!(income.len(), gross_profit.len());
    let periods: Vec<String> = (1..=income.len()).map(|i| format!("Q{}", i)).collect();
    let mut csv = format!("Name,{}\n", periods.join(","));
    csv.push_str(&format!(
        "Total Income,{}\n",
        income
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    ));
    csv.push_str(&format!(
        "Gross Profit,{}\n",
        gross_profit
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    ));
    csv
}

/// A config whose subject and peer globs point into the temp dir.
pub fn config_for(dir: &TempDir, subject_file: &str, tolerance: f64) -> Config {
    Config {
        company_name: "Testco".to_string(),
        subject_statement: dir
            .path()
            .join(subject_file)
            .to_string_lossy()
            .to_string(),
        peer_statements: format!("{}/peer_*.csv", dir.path().display()),
        on_par_tolerance: tolerance,
        output_dir: dir.path().join("output").to_string_lossy().to_string(),
    }
}
