use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("reCAPTCHA verification failed")]
    Verification { details: Vec<String> },

    #[error("{0}")]
    NotAvailable(String),

    #[error("Selected time slot is not available")]
    SlotFull,

    #[error("{0}")]
    InvalidId(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("storage error: {0}")]
    Persistence(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::Verification { .. }
            | AppError::NotAvailable(_)
            | AppError::SlotFull
            | AppError::InvalidId(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::Verification { details } => serde_json::json!({
                "message": self.to_string(),
                "details": details,
            }),
            AppError::Persistence(e) => {
                tracing::error!(error = %format!("{e:#}"), "request failed on storage");
                serde_json::json!({
                    "message": "The request could not be completed",
                    "error": e.to_string(),
                })
            }
            _ => serde_json::json!({ "message": self.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}
