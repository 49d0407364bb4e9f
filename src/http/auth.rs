//! Shared-secret guard for mutating endpoints.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::error::ApiError;
use crate::http::request::request_id;
use crate::http::server::AppState;

/// Reject requests whose secret header does not match the configured key.
///
/// With no key configured every request passes.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = &state.auth;
    if !auth.enabled() {
        return Ok(next.run(request).await);
    }

    let presented = request
        .headers()
        .get(auth.header.as_str())
        .and_then(|h| h.to_str().ok());

    if presented == Some(auth.api_key.as_str()) {
        return Ok(next.run(request).await);
    }

    tracing::warn!(
        request_id = %request_id(&request),
        path = %request.uri().path(),
        header_present = presented.is_some(),
        "Rejected request with bad API key"
    );
    Err(ApiError::Unauthorized)
}
