use crate::config::Config;
use crate::errors::JwksError;
use crate::services::token_service;
use axum::extract::{Query, State};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::instrument;

/// Query parameters accepted by the token endpoint
#[derive(Debug, Default)]
pub struct AuthQuery {
    pub expired: Option<String>,
}

impl AuthQuery {
    /// Build from raw query pairs. Only the first `expired` value counts;
    /// repeats and unknown parameters are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let expired = pairs
            .into_iter()
            .find(|(name, _)| name == "expired")
            .map(|(_, value)| value);

        AuthQuery { expired }
    }

    /// Whether the caller asked for a token signed by the expired key
    pub fn wants_expired(&self) -> bool {
        self.expired.as_deref().is_some_and(parse_bool_flag)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
}

/// Handle token request
///
/// POST /auth
/// POST /auth?expired=true
///
/// The response body is the bare compact JWT. Other methods are rejected with
/// 405 by the router before this handler runs.
#[instrument(name = "jwks.auth.issue", skip_all, fields(expired, status))]
pub async fn handle_auth(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<String, JwksError> {
    let want_expired = AuthQuery::from_pairs(params).wants_expired();
    tracing::Span::current().record("expired", want_expired);

    let result = token_service::issue_token(
        &state.pool,
        state.config.key_selection_policy,
        want_expired,
    )
    .await;

    let status = if result.is_ok() { "success" } else { "error" };
    tracing::Span::current().record("status", status);

    result
}

/// Truthy flag values: `1`, `t`, `T`, `true`, `TRUE`, `True`.
///
/// Anything else, including an empty value, is false.
pub fn parse_bool_flag(value: &str) -> bool {
    matches!(value, "1" | "t" | "T" | "true" | "TRUE" | "True")
}
