//! Deterministic cryptographic fixtures for testing
//!
//! RSA keys derived from a seeded RNG. The same seed always produces the same
//! key pair, so expected moduli can be compared across test runs.

use jsonwebtoken::DecodingKey;
use jwks_service::crypto;
use jwks_service::models::JsonWebKey;
use rand::{rngs::StdRng, SeedableRng};
use rsa::RsaPrivateKey;
use thiserror::Error;

/// Test fixture error type
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Cryptographic operation failed: {0}")]
    Crypto(String),
}

/// Generate a deterministic 2048-bit RSA signing key for testing.
///
/// # Example
/// ```rust,ignore
/// let key = test_rsa_key(1)?;
/// // Same seed always produces same key
/// assert_eq!(key, test_rsa_key(1)?);
/// ```
pub fn test_rsa_key(seed: u64) -> Result<RsaPrivateKey, FixtureError> {
    let mut rng = StdRng::seed_from_u64(seed);
    RsaPrivateKey::new(&mut rng, 2048)
        .map_err(|e| FixtureError::Crypto(format!("Failed to generate test key: {}", e)))
}

/// PKCS#1 DER bytes of [`test_rsa_key`], ready to insert into the key store.
pub fn test_rsa_key_der(seed: u64) -> Result<Vec<u8>, FixtureError> {
    let key = test_rsa_key(seed)?;
    crypto::encode_private_key(&key)
        .map_err(|e| FixtureError::Crypto(format!("Failed to encode test key: {}", e)))
}

/// Build a verification key from a published JWK.
pub fn decoding_key_from_jwk(jwk: &JsonWebKey) -> Result<DecodingKey, FixtureError> {
    DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
        .map_err(|e| FixtureError::Crypto(format!("Invalid JWK components: {}", e)))
}

/// Build a verification key straight from a private key.
pub fn decoding_key_from_private(key: &RsaPrivateKey) -> Result<DecodingKey, FixtureError> {
    let components = crypto::public_key_components(key);
    DecodingKey::from_rsa_components(&components.n, &components.e)
        .map_err(|e| FixtureError::Crypto(format!("Invalid key components: {}", e)))
}
