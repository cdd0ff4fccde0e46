pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::{extract::Request, ServiceExt};

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::repositories::{exams::ExamRepository, submissions::SubmissionRepository};
use crate::services::completion::{CompletionClient, OpenAiClient};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let storage = settings.storage();
    let exams = ExamRepository::new(db::open_collection(&settings, &storage.exams_path()));
    let submissions =
        SubmissionRepository::new(db::open_collection(&settings, &storage.submissions_path()));

    let completions = OpenAiClient::from_settings(&settings)?;
    if !completions.is_configured() {
        tracing::warn!("OPENAI_API_KEY is not set; AI marking and generation will fail");
    }

    let state = AppState::new(settings, exams, submissions, Arc::new(completions));
    let app = api::router::app(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        prefix = %state.settings().api().prefix,
        "DasMock exams API listening"
    );

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(core::shutdown::shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
