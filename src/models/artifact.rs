use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(rename = "_id")]
    pub id: String,
    pub artifact_name: String,
    pub description: String,
    pub location: String,
    pub acquisition_date: Option<String>,
    pub loan_status: String,
    pub image: Option<String>,
}
