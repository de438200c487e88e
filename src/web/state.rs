// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::Config;
use crate::narrative::NarrativeClient;
use crate::pipeline::AnalysisRun;

/// Application state shared across all routes. The analysis run is computed
/// once at startup; the narrative client is absent when no API keys are
/// configured and the chat endpoint degrades to 503.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub run: Arc<AnalysisRun>,
    pub narrative: Option<Arc<NarrativeClient>>,
}

impl AppState {
    pub fn new(config: Config, run: AnalysisRun, narrative: Option<NarrativeClient>) -> Self {
        Self {
            config,
            run: Arc::new(run),
            narrative: narrative.map(Arc::new),
        }
    }
}
