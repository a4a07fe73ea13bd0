use crate::errors::JwksError;
use crate::models::Jwks;
use crate::observability::record_jwks_request;
use crate::services::key_management_service;
use axum::{
    extract::State,
    http::header::{HeaderMap, HeaderValue, CACHE_CONTROL},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::auth_handler::AppState;

/// Handle JWKS request
///
/// GET /.well-known/jwks.json
///
/// Returns the currently valid public key in JWKS format (RFC 7517)
/// with Cache-Control header set to max-age=300 (5 minutes)
#[instrument(name = "jwks.jwks.get", skip_all, fields(status))]
pub async fn handle_get_jwks(
    State(state): State<Arc<AppState>>,
) -> Result<(HeaderMap, Json<Jwks>), JwksError> {
    let result = key_management_service::get_jwks(&state.pool, state.config.key_selection_policy).await;

    let status = if result.is_ok() { "success" } else { "error" };
    tracing::Span::current().record("status", status);
    record_jwks_request(status);

    let jwks = result?;

    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=300"));

    Ok((headers, Json(jwks)))
}
