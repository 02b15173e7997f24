use std::sync::Arc;

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::SlotDay;
use crate::services::booking::{self, BookingRequest};
use crate::state::AppState;

use super::json_body;

// GET /api/available-dates
pub async fn get_available_dates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SlotDay>>, AppError> {
    let days = {
        let db = state.db()?;
        queries::list_slot_days(&db).context("failed to fetch available dates")?
    };

    tracing::debug!(count = days.len(), "fetched available dates");
    Ok(Json(days))
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let request = json_body(payload)?;
    let booking = booking::create_booking(&state, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Booking created successfully",
            "booking": booking,
        })),
    ))
}
