use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::booking::StatusChange;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
    pub status: InquiryStatus,
    pub status_history: Vec<StatusChange<InquiryStatus>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InquiryStatus {
    New,
    Resolved,
}

impl InquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::New => "New",
            InquiryStatus::Resolved => "Resolved",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Resolved" => InquiryStatus::Resolved,
            _ => InquiryStatus::New,
        }
    }
}
