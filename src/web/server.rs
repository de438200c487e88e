// SPDX-FileCopyrightText: 2026 finbench contributors
//
// SPDX-License-Identifier: MIT

use axum::{Json, Router, routing::get, routing::post};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::web::{routes, state::AppState};

/// Create the Axum router with all routes
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Dashboard page
        .route("/", get(routes::pages::dashboard))
        // API endpoints
        .route("/api/metrics", get(routes::api::get_metrics))
        .route("/api/benchmarks", get(routes::api::get_benchmarks))
        .route("/api/comparison", get(routes::api::get_comparison))
        .route("/api/insights", get(routes::api::get_insights))
        .route("/api/chat", post(routes::api::chat))
        // Static file serving (charts land in the output dir)
        .nest_service("/output", ServeDir::new("output"))
        .layer(CorsLayer::permissive())
        // Share app state
        .with_state(state)
}

/// Start the web server
pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
