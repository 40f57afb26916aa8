//! Liveness endpoint.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::handler::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Number of titles in the cache.
    pub cached_titles: u64,
}

/// `GET /health`
///
/// Reads from the cache so that a broken database shows up as a 500.
pub async fn get_health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, ApiError> {
    let cached_titles = state.db.count_titles().await?;
    Ok(Json(HealthResponse { status: "ok".into(), cached_titles }))
}
