//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for issued tokens.

use crate::crypto_fixtures::decoding_key_from_jwk;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, Validation};
use jwks_service::models::JsonWebKey;
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
    #[serde(default)]
    pub kid: Option<String>,
}

/// JWT claims structure
#[derive(Debug, Deserialize)]
pub struct JwtClaims {
    pub exp: i64,
    pub iat: i64,
}

fn split_token(token: &str) -> Vec<&str> {
    let parts: Vec<_> = token.split('.').collect();
    assert_eq!(
        parts.len(),
        3,
        "JWT must have 3 parts (header.payload.signature), got {}",
        parts.len()
    );
    parts
}

fn parse_header(token: &str) -> JwtHeader {
    let parts = split_token(token);
    let header = URL_SAFE_NO_PAD
        .decode(parts[0])
        .expect("Invalid JWT header");
    serde_json::from_slice(&header).expect("Failed to parse JWT header")
}

/// Decode the claims without verifying the signature.
pub fn unverified_claims(token: &str) -> JwtClaims {
    let parts = split_token(token);
    let payload = URL_SAFE_NO_PAD
        .decode(parts[1])
        .expect("Invalid JWT payload");
    serde_json::from_slice(&payload).expect("Failed to parse JWT claims")
}

/// Custom assertions for issued tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_signed_by("1")
///     .assert_not_expired()
///     .assert_verifies_with(&jwks.keys[0]);
/// ```
pub trait TokenAssertions {
    /// Assert that the token is a well-formed RS256 JWT
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert that the token header carries the specified key id
    fn assert_signed_by(&self, key_id: &str) -> &Self;

    /// Assert that the `exp` claim is in the past
    fn assert_expired(&self) -> &Self;

    /// Assert that the `exp` claim is in the future
    fn assert_not_expired(&self) -> &Self;

    /// Assert that the signature verifies under the JWK and the token passes
    /// full validation, expiry included
    fn assert_verifies_with(&self, jwk: &JsonWebKey) -> &Self;

    /// Assert that the signature verifies under the JWK but validation fails
    /// because the token is expired
    fn assert_signature_valid_but_expired(&self, jwk: &JsonWebKey) -> &Self;
}

impl TokenAssertions for str {
    fn assert_valid_jwt(&self) -> &Self {
        let header = parse_header(self);
        assert_eq!(header.alg, "RS256", "Expected RS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");
        assert!(header.kid.is_some(), "Expected a kid header");

        // Must parse
        let _claims = unverified_claims(self);

        self
    }

    fn assert_signed_by(&self, key_id: &str) -> &Self {
        let header = parse_header(self);
        assert_eq!(
            header.kid.as_deref(),
            Some(key_id),
            "Expected key_id '{}', got {:?}",
            key_id,
            header.kid
        );

        self
    }

    fn assert_expired(&self) -> &Self {
        let claims = unverified_claims(self);
        let now = chrono::Utc::now().timestamp();
        assert!(
            claims.exp < now,
            "Expected token to be expired, exp={} now={}",
            claims.exp,
            now
        );

        self
    }

    fn assert_not_expired(&self) -> &Self {
        let claims = unverified_claims(self);
        let now = chrono::Utc::now().timestamp();
        assert!(
            claims.exp > now,
            "Expected token to be unexpired, exp={} now={}",
            claims.exp,
            now
        );

        self
    }

    fn assert_verifies_with(&self, jwk: &JsonWebKey) -> &Self {
        let key = decoding_key_from_jwk(jwk).expect("JWK should build a decoding key");
        let result = decode::<serde_json::Value>(self, &key, &Validation::new(Algorithm::RS256));
        assert!(
            result.is_ok(),
            "Token should verify against kid {}: {:?}",
            jwk.kid,
            result.err()
        );

        self
    }

    fn assert_signature_valid_but_expired(&self, jwk: &JsonWebKey) -> &Self {
        let key = decoding_key_from_jwk(jwk).expect("JWK should build a decoding key");

        let mut signature_only = Validation::new(Algorithm::RS256);
        signature_only.validate_exp = false;
        let result = decode::<serde_json::Value>(self, &key, &signature_only);
        assert!(
            result.is_ok(),
            "Signature should verify against kid {}: {:?}",
            jwk.kid,
            result.err()
        );

        let err = decode::<serde_json::Value>(self, &key, &Validation::new(Algorithm::RS256))
            .expect_err("Expired token must fail full validation");
        assert_eq!(
            err.kind(),
            &ErrorKind::ExpiredSignature,
            "Expected ExpiredSignature, got {:?}",
            err
        );

        self
    }
}
