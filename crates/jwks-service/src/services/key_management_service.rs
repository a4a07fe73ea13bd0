use crate::config::{Config, KeySelectionPolicy};
use crate::crypto;
use crate::errors::JwksError;
use crate::models::{JsonWebKey, Jwks};
use crate::observability::{key_state, record_key_generated};
use crate::repositories::signing_keys;
use chrono::Utc;
use rsa::RsaPrivateKey;
use sqlx::SqlitePool;
use tracing::instrument;

/// Identifiers of the keys created at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrappedKeys {
    pub valid_kid: i64,
    pub expired_kid: i64,
}

/// Generate and persist the startup signing keys.
///
/// Recreates the key table, then inserts one key expiring `key_lifetime_seconds`
/// from now followed by one that expired `key_lifetime_seconds` ago. The valid
/// key is always inserted first so it receives `kid = 1`. Any failure here must
/// stop the service from starting.
#[instrument(skip_all, fields(bits = config.rsa_key_bits))]
pub async fn bootstrap_signing_keys(
    pool: &SqlitePool,
    config: &Config,
) -> Result<BootstrappedKeys, JwksError> {
    signing_keys::initialize_schema(pool).await?;

    let now = Utc::now().timestamp();
    let lifetime = config.key_lifetime_seconds;
    let (valid_exp, expired_exp) = match (now.checked_add(lifetime), now.checked_sub(lifetime)) {
        (Some(valid), Some(expired)) => (valid, expired),
        _ => {
            return Err(JwksError::KeyGeneration(format!(
                "Key lifetime {} overflows the expiration timestamp",
                lifetime
            )))
        }
    };

    let valid_key = generate_key(config.rsa_key_bits).await?;
    let valid_kid = persist_key(pool, &valid_key, valid_exp, false).await?;

    let expired_key = generate_key(config.rsa_key_bits).await?;
    let expired_kid = persist_key(pool, &expired_key, expired_exp, true).await?;

    tracing::info!(valid_kid, expired_kid, "Signing keys bootstrapped");

    Ok(BootstrappedKeys {
        valid_kid,
        expired_kid,
    })
}

/// RSA generation is CPU bound, keep it off the async workers.
async fn generate_key(bits: usize) -> Result<RsaPrivateKey, JwksError> {
    tokio::task::spawn_blocking(move || crypto::generate_signing_key(bits))
        .await
        .map_err(|e| JwksError::KeyGeneration(format!("Key generation task failed: {}", e)))?
}

async fn persist_key(
    pool: &SqlitePool,
    private_key: &RsaPrivateKey,
    exp: i64,
    expired: bool,
) -> Result<i64, JwksError> {
    let der = crypto::encode_private_key(private_key)?;
    let kid = signing_keys::insert_key(pool, &der, exp).await?;

    record_key_generated(key_state(expired));
    tracing::debug!(kid, exp, key_state = key_state(expired), "Signing key stored");

    Ok(kid)
}

/// Get JWKS (JSON Web Key Set) for public key distribution
///
/// Publishes only the currently valid key; the expired key is never exposed.
#[instrument(skip_all, fields(policy = policy.as_str()))]
pub async fn get_jwks(pool: &SqlitePool, policy: KeySelectionPolicy) -> Result<Jwks, JwksError> {
    let record = signing_keys::select_key(pool, false, policy, Utc::now().timestamp()).await?;

    let private_key = crypto::decode_private_key(&record.key)?;
    let components = crypto::public_key_components(&private_key);

    Ok(Jwks {
        keys: vec![JsonWebKey {
            kid: record.kid_string(),
            alg: "RS256".to_string(),
            kty: "RSA".to_string(),
            use_: "sig".to_string(),
            n: components.n,
            e: components.e,
        }],
    })
}
