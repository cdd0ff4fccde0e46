use axum::extract::{Path, State};
use axum::Json;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::Exam;
use crate::schemas::MessageResponse;

pub(crate) async fn list_own_exams(
    State(state): State<AppState>,
) -> Result<Json<Vec<Exam>>, ApiError> {
    let examiner_id = &state.settings().exam().examiner_id;
    let exams = state
        .exams()
        .get_by_creator(examiner_id)
        .await
        .map_err(|err| ApiError::internal(err, "Failed to list exams"))?;

    Ok(Json(exams))
}

/// Full record, answers included.
pub(crate) async fn get_exam(
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
) -> Result<Json<Exam>, ApiError> {
    let exam = state
        .exams()
        .get_by_id(&exam_id)
        .await
        .map_err(|err| ApiError::internal(err, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    Ok(Json(exam))
}

/// Submissions for the exam are kept so the leaderboard history survives.
pub(crate) async fn delete_exam(
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = state
        .exams()
        .delete(&exam_id)
        .await
        .map_err(|err| ApiError::internal(err, "Failed to delete exam"))?;

    if !removed {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    Ok(Json(MessageResponse { message: "Exam deleted successfully".to_string() }))
}
