use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Artifact;
use crate::state::AppState;

// GET /api/artifacts
pub async fn list_artifacts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Artifact>>, AppError> {
    let db = state.db()?;
    let artifacts = queries::list_artifacts(&db).context("failed to fetch artifacts")?;
    Ok(Json(artifacts))
}

// GET /api/artifacts/:id
pub async fn get_artifact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Artifact>, AppError> {
    if Uuid::parse_str(&id).is_err() {
        return Err(AppError::InvalidId("Invalid artifact ID format".to_string()));
    }

    let db = state.db()?;
    queries::get_artifact_by_id(&db, &id)
        .context("failed to fetch artifact")?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Artifact not found".to_string()))
}
