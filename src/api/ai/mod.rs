mod handlers;

use axum::{routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/ai-marking", post(handlers::ai_marking))
        .route("/create-ai-exam", post(handlers::create_ai_exam))
}
