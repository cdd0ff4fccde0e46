use axum::extract::rejection::JsonRejection;
use axum::Json;
use validator::Validate;

use crate::api::errors::ApiError;

/// Unwraps a JSON body so malformed input gets the same JSON error shape as every other
/// client error.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| {
            ApiError::BadRequest(format!("Invalid JSON body: {}", rejection.body_text()))
        })
}

pub(crate) fn validated<T: Validate>(value: T) -> Result<T, ApiError> {
    value.validate().map_err(|errors| ApiError::BadRequest(describe(&errors)))?;
    Ok(value)
}

fn describe(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();

    messages.extend(errors.errors().iter().filter_map(|(field, kind)| match kind {
        validator::ValidationErrorsKind::Field(_) => None,
        _ => Some(format!("{field} is invalid")),
    }));

    if messages.is_empty() {
        "Invalid request".to_string()
    } else {
        messages.sort();
        messages.join("; ")
    }
}
