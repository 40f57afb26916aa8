//! Title lookup endpoints.
//!
//! `POST /get-titles` resolves a list of URLs and answers with one item per
//! input, in input order. `POST /get-title` resolves a single URL.
//!
//! Resolution failures are never HTTP errors: the item carries `title: null`
//! and an `error`. Only a malformed request body is answered with 400.

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use pagetitle_client::Resolution;
use pagetitle_core::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ErrorBody};
use crate::handler::AppState;

/// Request body for `POST /get-titles`.
#[derive(Debug, Clone, Deserialize)]
pub struct TitlesRequest {
    /// URLs to resolve. Entries that are not strings are reported as invalid.
    pub urls: Vec<Value>,
}

/// Request body for `POST /get-title`.
#[derive(Debug, Clone, Deserialize)]
pub struct TitleRequest {
    #[serde(default)]
    pub url: Value,
}

/// How an item was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Fetched from the network and cached.
    Fetched,
    /// Returned from cache.
    Cached,
    /// Fetch failed.
    Failed,
    /// Input was not a non-empty string.
    Invalid,
}

/// Result for one URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleItem {
    /// The URL exactly as received.
    pub url: Value,
    /// Resolved title, `null` on failure.
    pub title: Option<String>,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl TitleItem {
    pub fn new(url: Value, resolution: Resolution) -> Self {
        match resolution {
            Resolution::Fetched(title) => Self { url, title: Some(title), status: ItemStatus::Fetched, error: None },
            Resolution::Cached(title) => Self { url, title: Some(title), status: ItemStatus::Cached, error: None },
            Resolution::Failed(err) => {
                let status = match &err {
                    Error::InvalidInput(_) => ItemStatus::Invalid,
                    _ => ItemStatus::Failed,
                };
                Self { url, title: None, status, error: Some(ErrorBody::from(&err)) }
            }
        }
    }
}

/// `POST /get-titles`
pub async fn get_titles(
    State(state): State<Arc<AppState>>, payload: Result<Json<TitlesRequest>, JsonRejection>,
) -> Result<Json<Vec<TitleItem>>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::bad_request(format!("Expected 'urls' as a list in JSON body: {}", rejection.body_text()))
    })?;

    let inputs = request.urls.iter().map(|url| url.as_str().map(str::to_string)).collect();
    let resolutions = state.resolver.resolve_batch(inputs).await;

    let items: Vec<TitleItem> = request
        .urls
        .into_iter()
        .zip(resolutions)
        .map(|(url, resolution)| TitleItem::new(url, resolution))
        .collect();

    tracing::info!(
        total = items.len(),
        cached = items.iter().filter(|i| i.status == ItemStatus::Cached).count(),
        failed = items.iter().filter(|i| i.title.is_none()).count(),
        "resolved title batch"
    );

    Ok(Json(items))
}

/// `POST /get-title`
pub async fn get_title(
    State(state): State<Arc<AppState>>, payload: Result<Json<TitleRequest>, JsonRejection>,
) -> Result<Json<TitleItem>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        ApiError::bad_request(format!("Expected 'url' in JSON body: {}", rejection.body_text()))
    })?;

    let url = match request.url.as_str() {
        Some(url) if !url.trim().is_empty() => url.to_string(),
        _ => return Err(Error::InvalidInput("Expected 'url' as a non-empty string".into()).into()),
    };

    let resolution = state.resolver.resolve(&url).await;

    Ok(Json(TitleItem::new(request.url, resolution)))
}
