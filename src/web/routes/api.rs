// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::web::state::AppState;

/// The full metric table for the subject company.
pub async fn get_metrics(State(state): State<AppState>) -> Json<serde_json::Value> {
    let series: Vec<serde_json::Value> = state
        .run
        .subject_metrics
        .series
        .iter()
        .map(|s| {
            json!({
                "metric": s.name,
                "category": s.category.label(),
                "values": s.values,
            })
        })
        .collect();

    Json(json!({
        "company": state.run.company_name,
        "periods": state.run.subject_metrics.periods,
        "metrics": series,
    }))
}

/// The industry averages and how many observations back each one.
pub async fn get_benchmarks(State(state): State<AppState>) -> Json<serde_json::Value> {
    let benchmarks: Vec<serde_json::Value> = state
        .run
        .benchmarks
        .iter()
        .map(|b| {
            json!({
                "metric": b.metric,
                "value": b.value,
                "sample_size": b.sample_size,
            })
        })
        .collect();

    Json(json!({
        "peer_count": state.run.peer_count,
        "benchmarks": benchmarks,
    }))
}

/// Every comparison record of the current run.
pub async fn get_comparison(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "company": state.run.company_name,
        "records": state.run.comparisons,
    }))
}

/// The formatted insight sentences, in catalog-then-period order.
pub async fn get_insights(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "company": state.run.company_name,
        "insights": state.run.insights,
    }))
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// One chat exchange grounded in the run's insights. Returns 503 when no
/// narrative client is configured.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let narrative = state
        .narrative
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    let answer = crate::chat::chatbot_response(
        narrative,
        &state.run.company_name,
        &request.message,
        &state.run.insights,
    )
    .await
    .map_err(|e| {
        eprintln!("⚠️  Chat request failed: {}", e);
        StatusCode::BAD_GATEWAY
    })?;

    Ok(Json(json!({ "answer": answer })))
}
