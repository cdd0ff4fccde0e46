mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/save-exam", post(handlers::save_exam))
        .route("/exams", get(handlers::list_exams))
        .route("/exams/:exam_id", get(handlers::get_exam))
        .route("/exams/:exam_id/submissions", post(handlers::create_submission))
}
