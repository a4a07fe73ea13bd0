use crate::config::KeySelectionPolicy;
use crate::crypto::{self, Claims};
use crate::errors::JwksError;
use crate::observability::{key_state, record_token_issuance};
use crate::repositories::signing_keys;
use chrono::Utc;
use sqlx::SqlitePool;
use std::time::Instant;
use tracing::instrument;

/// Issue a signed RS256 token.
///
/// `want_expired` selects the expired key instead of the valid one. The token's
/// `exp` claim is the selected key's stored expiration, so a token from the
/// expired key fails expiry validation while its signature still verifies.
#[instrument(skip_all, fields(key_state = key_state(want_expired), kid))]
pub async fn issue_token(
    pool: &SqlitePool,
    policy: KeySelectionPolicy,
    want_expired: bool,
) -> Result<String, JwksError> {
    let start = Instant::now();
    let result = sign_with_selected_key(pool, policy, want_expired).await;

    let status = if result.is_ok() { "success" } else { "error" };
    record_token_issuance(key_state(want_expired), status, start.elapsed());

    result
}

async fn sign_with_selected_key(
    pool: &SqlitePool,
    policy: KeySelectionPolicy,
    want_expired: bool,
) -> Result<String, JwksError> {
    let now = Utc::now().timestamp();

    let signing_key = signing_keys::select_key(pool, want_expired, policy, now).await?;
    tracing::Span::current().record("kid", signing_key.kid);

    let claims = Claims {
        exp: signing_key.exp,
        iat: now,
    };

    crypto::sign_jwt(&claims, &signing_key.key, &signing_key.kid_string())
}
