use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

use museo::config::AppConfig;
use museo::db;
use museo::routes;
use museo::services::messaging::smtp::SmtpMailer;
use museo::services::verification::recaptcha::RecaptchaVerifier;
use museo::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    anyhow::ensure!(
        !config.recaptcha_secret.is_empty(),
        "RECAPTCHA_SECRET_KEY must be set"
    );
    if !config.email_configured() {
        tracing::warn!("EMAIL_USER / EMAIL_APP_PASSWORD not set, confirmation emails will fail");
    }

    let conn = db::init_db(&config.database_url)?;

    let verifier = RecaptchaVerifier::new(config.recaptcha_secret.clone());
    let mailer = SmtpMailer::new(
        &config.smtp_server,
        config.smtp_port,
        config.email_user.clone(),
        config.email_app_password.clone(),
        config.email_from_name.clone(),
    )?;

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        verifier: Box::new(verifier),
        mailer: Box::new(mailer),
    });

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
