use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::messaging::Mailer;
use crate::services::verification::Verifier;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub verifier: Box<dyn Verifier>,
    pub mailer: Box<dyn Mailer>,
}

impl AppState {
    /// Locks the shared connection. The guard must not be held across an `.await`.
    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Persistence(anyhow::anyhow!("database lock poisoned")))
    }
}
