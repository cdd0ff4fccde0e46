use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::validation::{json_body, validated};
use crate::core::state::AppState;
use crate::schemas::generation::{GenerateExamRequest, GeneratedExam};
use crate::schemas::marking::{AiMarkingRequest, AiMarkingResponse};

const MISSING_MARKING_INPUT: &str = "Missing answers, criteria, or totalMarks";

pub(crate) async fn ai_marking(
    State(state): State<AppState>,
    payload: Result<Json<AiMarkingRequest>, JsonRejection>,
) -> Result<Json<AiMarkingResponse>, ApiError> {
    let request = json_body(payload)?;
    let request = validated(request)?;

    // A zero total is treated the same as an absent one.
    let (Some(answers), Some(criteria), Some(total_marks)) =
        (request.answers, request.criteria, request.total_marks.filter(|total| *total > 0))
    else {
        return Err(ApiError::BadRequest(MISSING_MARKING_INPUT.to_string()));
    };

    let response = state
        .marking()
        .mark_exam(&answers, &criteria, total_marks)
        .await
        .map_err(|err| ApiError::upstream(&err, "Failed to mark with AI"))?;

    Ok(Json(response))
}

pub(crate) async fn create_ai_exam(
    State(state): State<AppState>,
    payload: Result<Json<GenerateExamRequest>, JsonRejection>,
) -> Result<Json<GeneratedExam>, ApiError> {
    let request = validated(json_body(payload)?)?;

    let exam = state
        .generator()
        .generate(&request)
        .await
        .map_err(|err| ApiError::upstream(&err, "Failed to generate exam with AI"))?;

    Ok(Json(exam))
}
