mod handlers;

use axum::{routing::get, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/exams", get(handlers::list_own_exams))
        .route("/exams/:exam_id", get(handlers::get_exam).delete(handlers::delete_exam))
}
