// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

use askama::Template;
use axum::{extract::State, response::Html};

use crate::web::state::AppState;

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    title: String,
    company: String,
    peer_count: usize,
    rows: Vec<ComparisonRow>,
    insights: Vec<String>,
}

struct ComparisonRow {
    metric: String,
    period: String,
    subject: String,
    benchmark: String,
    difference: String,
    standing: String,
}

/// Dashboard page handler
pub async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let rows = state
        .run
        .comparisons
        .iter()
        .map(|c| ComparisonRow {
            metric: c.metric.clone(),
            period: c.period.clone(),
            subject: format!("{:.2}", c.subject),
            benchmark: format!("{:.2}", c.benchmark),
            difference: format!("{:+.2}", c.difference),
            standing: c.standing.label().to_string(),
        })
        .collect();

    let template = DashboardTemplate {
        title: "Benchmarking Dashboard".to_string(),
        company: state.run.company_name.clone(),
        peer_count: state.run.peer_count,
        rows,
        insights: state.run.insights.clone(),
    };
    Html(template.render().unwrap_or_else(|e| {
        eprintln!("⚠️  Template render failed: {}", e);
        String::from("<h1>Render error</h1>")
    }))
}
