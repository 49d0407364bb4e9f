//! Request handlers for the lookup API.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    /// Entries in the active table.
    pub loaded: usize,
    /// Source of the active table; `null` before the first load.
    pub csv_path: Option<String>,
    pub generation: u64,
    /// Unix seconds of the last successful install.
    pub loaded_at: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LookupRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    /// The requested email, trimmed but with its original case.
    pub email: String,
    pub login_link: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReloadRequest {
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResponse {
    pub reloaded: bool,
    pub count: usize,
    pub path: String,
    pub duplicates_dropped: usize,
    pub rows_skipped: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.store.snapshot();
    Json(HealthResponse {
        ok: true,
        loaded: snapshot.len(),
        csv_path: snapshot.path().map(|p| p.display().to_string()),
        generation: snapshot.generation,
        loaded_at: snapshot.is_loaded().then_some(snapshot.loaded_at),
    })
}

pub async fn lookup_query(
    State(state): State<AppState>,
    query: Result<Query<LookupRequest>, QueryRejection>,
) -> Result<Json<LookupResponse>, ApiError> {
    let Query(query) = query.map_err(|e| {
        metrics::record_lookup("invalid");
        ApiError::Validation(format!("invalid query string: {}", e.body_text()))
    })?;
    lookup_email(&state, query.email.as_deref())
}

pub async fn lookup_body(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LookupResponse>, ApiError> {
    let request: LookupRequest = parse_json_body(&body)?;
    lookup_email(&state, request.email.as_deref())
}

pub async fn reload(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ReloadResponse>, ApiError> {
    let request: ReloadRequest = parse_json_body(&body)?;
    let info = state.reloader.reload(request.path.as_deref()).await?;

    Ok(Json(ReloadResponse {
        reloaded: true,
        count: info.record_count,
        path: info.source_path.display().to_string(),
        duplicates_dropped: info.duplicates_dropped,
        rows_skipped: info.rows_skipped,
    }))
}

fn lookup_email(state: &AppState, email: Option<&str>) -> Result<Json<LookupResponse>, ApiError> {
    let email = email.map(str::trim).unwrap_or_default();
    if email.is_empty() {
        metrics::record_lookup("invalid");
        return Err(ApiError::Validation("email is required".to_string()));
    }

    match state.store.lookup(email) {
        Some(login_link) => {
            metrics::record_lookup("hit");
            Ok(Json(LookupResponse {
                email: email.to_string(),
                login_link,
            }))
        }
        None => {
            metrics::record_lookup("miss");
            tracing::debug!(email = %email, "Lookup miss");
            Err(ApiError::NotFound)
        }
    }
}

/// Parse an optional JSON body; an empty body yields the default request.
fn parse_json_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::Validation(format!("invalid JSON body: {e}")))
}
