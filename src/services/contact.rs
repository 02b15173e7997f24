use anyhow::Context;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Inquiry, InquiryStatus, LogbookEntry, StatusChange};
use crate::services::{notification, required, verification};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub recaptcha_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogbookRequest {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub recaptcha_token: Option<String>,
}

pub async fn submit_inquiry(state: &AppState, request: InquiryRequest) -> Result<Inquiry, AppError> {
    let (Some(full_name), Some(email), Some(subject), Some(message), Some(token)) = (
        required(&request.full_name),
        required(&request.email),
        required(&request.subject),
        required(&request.message),
        required(&request.recaptcha_token),
    ) else {
        return Err(AppError::Validation("All fields are required".to_string()));
    };

    verification::verify_token(state.verifier.as_ref(), token, state.config.verification_timeout)
        .await?;

    let inquiry = Inquiry {
        id: Uuid::new_v4().to_string(),
        full_name: full_name.to_string(),
        email: email.to_string(),
        subject: subject.to_string(),
        message: message.to_string(),
        submitted_at: Utc::now(),
        status: InquiryStatus::New,
        status_history: vec![StatusChange::new(InquiryStatus::New, "Inquiry received")],
    };

    {
        let db = state.db()?;
        queries::create_inquiry(&db, &inquiry).context("failed to insert inquiry")?;
    }
    tracing::info!(inquiry_id = %inquiry.id, "inquiry received");

    notification::notify_inquiry_received(state, &inquiry).await;

    Ok(inquiry)
}

/// Signs the guestbook. The verification token is optional here and only
/// checked when the form sends one.
pub async fn submit_logbook(
    state: &AppState,
    request: LogbookRequest,
) -> Result<LogbookEntry, AppError> {
    let (Some(name), Some(gender), Some(address)) = (
        required(&request.name),
        required(&request.gender),
        required(&request.address),
    ) else {
        return Err(AppError::Validation("All fields are required".to_string()));
    };

    if let Some(token) = required(&request.recaptcha_token) {
        verification::verify_token(state.verifier.as_ref(), token, state.config.verification_timeout)
            .await?;
    }

    let entry = LogbookEntry {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        gender: gender.to_string(),
        address: address.to_string(),
        timestamp: Utc::now(),
    };

    {
        let db = state.db()?;
        queries::create_logbook_entry(&db, &entry).context("failed to insert logbook entry")?;
    }
    tracing::info!(entry_id = %entry.id, "logbook entry added");

    Ok(entry)
}
