use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub recaptcha_secret: String,
    pub verification_timeout: Duration,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub email_user: String,
    pub email_app_password: String,
    pub email_from_name: String,
    pub notification_timeout: Duration,
    pub cors_origins: Vec<String>,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parsed("PORT", 5000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "museo.db".to_string()),
            recaptcha_secret: trimmed("RECAPTCHA_SECRET_KEY"),
            verification_timeout: Duration::from_secs(parsed("VERIFICATION_TIMEOUT_SECS", 5)),
            smtp_server: env::var("SMTP_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: parsed("SMTP_PORT", 587),
            email_user: trimmed("EMAIL_USER"),
            email_app_password: trimmed("EMAIL_APP_PASSWORD"),
            email_from_name: env::var("EMAIL_FROM_NAME")
                .unwrap_or_else(|_| "Museo de Malaquing Tubig".to_string()),
            notification_timeout: Duration::from_secs(parsed("NOTIFICATION_TIMEOUT_SECS", 10)),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|v| split_origins(&v))
                .unwrap_or_else(|_| vec!["http://localhost:5173".to_string()]),
            rate_limit_max: parsed("RATE_LIMIT_MAX", 100),
            rate_limit_window: Duration::from_secs(parsed("RATE_LIMIT_WINDOW_SECS", 15 * 60)),
        }
    }

    pub fn email_configured(&self) -> bool {
        !self.email_user.is_empty() && !self.email_app_password.is_empty()
    }
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

// Credentials pasted into .env files often carry stray whitespace.
fn trimmed(key: &str) -> String {
    env::var(key).map(|v| v.trim().to_string()).unwrap_or_default()
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_origins() {
        assert_eq!(
            split_origins(" http://a.test ,,https://b.test"),
            vec!["http://a.test".to_string(), "https://b.test".to_string()]
        );
        assert!(split_origins("").is_empty());
    }
}
