// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Structural problems in an input statement table. These are fatal to the
/// single load that hit them; other statements in the same run are unaffected.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("statement table has no line-item name column")]
    MissingNameColumn,

    #[error("statement table has no period columns")]
    NoPeriodColumns,

    #[error("duplicate line item '{0}' in statement")]
    DuplicateLineItem(String),

    #[error("failed to read statement: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to open statement: {0}")]
    Io(#[from] std::io::Error),
}

/// A remote narrative collaborator failed after exhausting its retries.
/// Carries the last underlying error; the local pipeline output stays valid.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} request failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        service: &'static str,
        attempts: u32,
        last_error: String,
    },

    #[error("{service} returned an unusable response: {detail}")]
    BadResponse {
        service: &'static str,
        detail: String,
    },

    #[error("{service} API key is not configured (set {env_var})")]
    MissingApiKey {
        service: &'static str,
        env_var: &'static str,
    },
}
