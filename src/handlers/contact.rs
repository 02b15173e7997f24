use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::errors::AppError;
use crate::services::contact::{self, InquiryRequest, LogbookRequest};
use crate::state::AppState;

use super::json_body;

// POST /api/inquiries
pub async fn submit_inquiry(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InquiryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let request = json_body(payload)?;
    let inquiry = contact::submit_inquiry(&state, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Inquiry submitted successfully",
            "inquiry": inquiry,
        })),
    ))
}

// POST /api/submit-logbook
//
// The guestbook form reads `{error}` rather than `{message}` on failure.
pub async fn submit_logbook(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LogbookRequest>, JsonRejection>,
) -> Response {
    let result = match json_body(payload) {
        Ok(request) => contact::submit_logbook(&state, request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(entry) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Data submitted successfully!",
                "result": { "acknowledged": true, "insertedId": entry.id },
            })),
        )
            .into_response(),
        Err(e) => {
            let message = match &e {
                AppError::Persistence(_) => {
                    tracing::error!(error = %e, "failed to insert logbook entry");
                    "Failed to insert data".to_string()
                }
                _ => e.to_string(),
            };
            (e.status(), Json(serde_json::json!({ "error": message }))).into_response()
        }
    }
}
