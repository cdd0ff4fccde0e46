use axum::extract::{rejection::JsonRejection, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::validation::{json_body, validated};
use crate::core::state::AppState;
use crate::core::time::now_utc;
use crate::db::models::Submission;
use crate::repositories::exams::SaveOutcome;
use crate::schemas::exam::{ExamSummary, SaveExamRequest, SaveExamResponse, StudentExamView};
use crate::schemas::leaderboard::SubmissionCreate;
use crate::schemas::MessageResponse;
use crate::services::exam_drafts::{exam_from_draft, new_exam_id, DraftContext};

/// The editor screens read `message` rather than `error`, so saving has its own shape.
#[derive(Debug)]
pub(crate) enum SaveExamError {
    InvalidPayload(String),
    Storage,
}

impl IntoResponse for SaveExamError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SaveExamError::InvalidPayload(detail) => {
                (StatusCode::BAD_REQUEST, format!("Invalid exam payload: {detail}"))
            }
            SaveExamError::Storage => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to save exam".to_string())
            }
        };
        (status, Json(MessageResponse { message })).into_response()
    }
}

pub(crate) async fn save_exam(
    State(state): State<AppState>,
    payload: Result<Json<SaveExamRequest>, JsonRejection>,
) -> Result<Json<SaveExamResponse>, SaveExamError> {
    let Json(draft) =
        payload.map_err(|rejection| SaveExamError::InvalidPayload(rejection.body_text()))?;
    let now = now_utc();

    let existing = match draft.id.as_deref().filter(|id| !id.trim().is_empty()) {
        Some(id) => state.exams().get_by_id(id).await.map_err(|err| {
            tracing::error!(error = %err, exam_id = %id, "Failed to look up exam for save");
            SaveExamError::Storage
        })?,
        None => None,
    };
    let exam_id = existing.map(|exam| exam.id).unwrap_or_else(|| new_exam_id(now));

    let settings = state.settings().exam();
    let exam = exam_from_draft(
        draft,
        DraftContext {
            exam_id,
            examiner_id: &settings.examiner_id,
            default_duration: settings.default_duration_minutes,
            now,
        },
    );

    let outcome = state.exams().save(exam).await.map_err(|err| {
        tracing::error!(error = %err, "Failed to save exam");
        SaveExamError::Storage
    })?;

    let message = match outcome {
        SaveOutcome::Created(_) => "Exam saved successfully!",
        SaveOutcome::Updated(_) => "Exam updated successfully!",
    };

    Ok(Json(SaveExamResponse { message: message.to_string(), exam_id: outcome.exam().id.clone() }))
}

pub(crate) async fn list_exams(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExamSummary>>, ApiError> {
    let exams = state
        .exams()
        .get_all()
        .await
        .map_err(|err| ApiError::internal(err, "Failed to fetch exams"))?;

    Ok(Json(exams.iter().map(ExamSummary::from).collect()))
}

pub(crate) async fn get_exam(
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
) -> Result<Json<StudentExamView>, ApiError> {
    let exam = state
        .exams()
        .get_by_id(&exam_id)
        .await
        .map_err(|err| ApiError::internal(err, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    Ok(Json(StudentExamView::from(exam)))
}

pub(crate) async fn create_submission(
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
    payload: Result<Json<SubmissionCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Submission>), ApiError> {
    let payload = validated(json_body(payload)?)?;

    let exam = state
        .exams()
        .get_by_id(&exam_id)
        .await
        .map_err(|err| ApiError::internal(err, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    let submission = Submission {
        id: Uuid::new_v4().to_string(),
        exam_id: exam.id,
        student_name: payload.student_name,
        score: payload.score,
        submitted_at: now_utc(),
    };

    let submission = state
        .submissions()
        .record(submission)
        .await
        .map_err(|err| ApiError::internal(err, "Failed to record submission"))?;

    Ok((StatusCode::CREATED, Json(submission)))
}
