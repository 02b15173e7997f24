use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A guestbook signature left by a visitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogbookEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub gender: String,
    pub address: String,
    pub timestamp: DateTime<Utc>,
}
