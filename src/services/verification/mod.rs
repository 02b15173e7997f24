pub mod recaptcha;

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::AppError;

/// Error code reported when the provider does not answer in time.
pub const TIMEOUT_CODE: &str = "verification-timeout";
/// Error code reported when the provider could not be reached at all.
pub const UNAVAILABLE_CODE: &str = "verification-unavailable";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Passed,
    Failed { error_codes: Vec<String> },
}

#[async_trait]
pub trait Verifier: Send + Sync {
    async fn verify(&self, token: &str) -> anyhow::Result<VerificationOutcome>;
}

/// Runs the human-verification check, failing closed on errors and timeouts.
pub async fn verify_token(
    verifier: &dyn Verifier,
    token: &str,
    timeout: Duration,
) -> Result<(), AppError> {
    let details = match tokio::time::timeout(timeout, verifier.verify(token)).await {
        Ok(Ok(VerificationOutcome::Passed)) => return Ok(()),
        Ok(Ok(VerificationOutcome::Failed { error_codes })) => error_codes,
        Ok(Err(e)) => {
            tracing::error!(error = %format!("{e:#}"), "verification provider unreachable");
            vec![UNAVAILABLE_CODE.to_string()]
        }
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "verification timed out");
            vec![TIMEOUT_CODE.to_string()]
        }
    };

    tracing::warn!(codes = ?details, "verification failed");
    Err(AppError::Verification { details })
}
