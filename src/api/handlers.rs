use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::collections::HashMap;

use crate::core::metrics;
use crate::core::state::AppState;
use crate::schemas::{HealthResponse, RootResponse};

pub(crate) async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let api = state.settings().api();
    let response = RootResponse {
        message: api.project_name.clone(),
        version: api.version.clone(),
        api_prefix: api.prefix.clone(),
    };

    Json(response)
}

pub(crate) async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut status = "healthy".to_string();
    let mut components = HashMap::new();

    let backend = state.exams().backend();
    match backend.load().await {
        Ok(exams) => {
            tracing::debug!(
                store = %backend.describe(),
                exams = exams.len(),
                "Exam store readable"
            );
            components.insert("exam_store".to_string(), "healthy".to_string());
        }
        Err(err) => {
            components.insert("exam_store".to_string(), format!("unhealthy: {err}"));
            status = "unhealthy".to_string();
        }
    }

    if state.completions().is_configured() {
        components.insert("ai".to_string(), "configured".to_string());
    } else {
        components.insert("ai".to_string(), "not configured".to_string());
        if status == "healthy" {
            status = "degraded".to_string();
        }
    }

    Json(HealthResponse { service: "dasmock-api".to_string(), status, components })
}

pub(crate) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    if !state.settings().telemetry().prometheus_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    match metrics::render() {
        Some(body) => ([(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
            .into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
