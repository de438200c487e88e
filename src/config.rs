// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// One parameterized analysis run: subject statement, peer selection, the
/// comparison tolerance and output location all come from configuration so
/// there is a single pipeline instead of per-dataset copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub company_name: String,
    pub subject_statement: String,
    /// Glob pattern selecting the peer statement files.
    pub peer_statements: String,
    #[serde(default)]
    pub on_par_tolerance: f64,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_output_dir() -> String {
    "output".to_string()
}

impl Default for Config {
    fn default() -> Self {
        // Try config.toml first, fall back to the sample data layout.
        if let Ok(config) = load_config() {
            return config;
        }

        Self {
            company_name: "B.T.R Nation".to_string(),
            subject_statement: "data/main_company.csv".to_string(),
            peer_statements: "data/peer_*.csv".to_string(),
            on_par_tolerance: 0.0,
            output_dir: default_output_dir(),
        }
    }
}

fn get_config_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("config.toml");
    path
}

pub fn load_config() -> anyhow::Result<Config> {
    let config_path = get_config_path();
    match fs::read_to_string(&config_path) {
        Ok(config_str) => match toml::from_str(&config_str) {
            Ok(config) => Ok(config),
            Err(e) => {
                eprintln!("Failed to parse config.toml: {}", e);
                Err(e.into())
            }
        },
        Err(e) => Err(e.into()),
    }
}
