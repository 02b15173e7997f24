pub mod artifacts;
pub mod bookings;
pub mod contact;
pub mod health;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::errors::AppError;

/// Unwraps a JSON body, reporting malformed payloads as validation errors.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::Validation(e.body_text()))
}
