use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use super::{VerificationOutcome, Verifier};

const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

pub struct RecaptchaVerifier {
    secret: String,
    client: reqwest::Client,
}

impl RecaptchaVerifier {
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

impl From<SiteVerifyResponse> for VerificationOutcome {
    fn from(resp: SiteVerifyResponse) -> Self {
        if resp.success {
            VerificationOutcome::Passed
        } else {
            VerificationOutcome::Failed {
                error_codes: resp.error_codes,
            }
        }
    }
}

#[async_trait]
impl Verifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> anyhow::Result<VerificationOutcome> {
        let resp: SiteVerifyResponse = self
            .client
            .post(SITEVERIFY_URL)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await
            .context("failed to call reCAPTCHA siteverify")?
            .error_for_status()
            .context("reCAPTCHA siteverify returned error")?
            .json()
            .await
            .context("failed to parse reCAPTCHA response")?;

        Ok(resp.into())
    }
}
