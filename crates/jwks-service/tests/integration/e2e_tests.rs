//! End-to-end verification flow
//!
//! A relying party fetches the key set, requests tokens and verifies them the
//! way a real consumer would.

use jwks_service::config::KeySelectionPolicy;
use jwks_service::crypto;
use jwks_service::models::JsonWebKey;
use jwks_service::repositories::signing_keys;
use jwks_test_utils::{
    decoding_key_from_private, test_rsa_key, test_rsa_key_der, TestJwksServer, TokenAssertions,
};

/// Rebuild the public JWK of the expired key straight from the key store.
///
/// The expired key is never published, so tests that want to check its
/// signature have to reach past the HTTP surface.
async fn expired_jwk(server: &TestJwksServer) -> Result<JsonWebKey, anyhow::Error> {
    let now = chrono::Utc::now().timestamp();
    let record =
        signing_keys::select_key(server.pool(), true, KeySelectionPolicy::Expiry, now).await?;
    let components = crypto::public_key_components(&crypto::decode_private_key(&record.key)?);

    Ok(JsonWebKey {
        kid: record.kid_string(),
        alg: "RS256".to_string(),
        kty: "RSA".to_string(),
        use_: "sig".to_string(),
        n: components.n,
        e: components.e,
    })
}

#[tokio::test]
async fn test_publish_issue_verify_flow() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;

    // 1. Fetch the published key set
    let jwks = server.fetch_jwks().await?;
    assert_eq!(jwks.keys.len(), 1);
    let published = &jwks.keys[0];
    assert_eq!(published.kty, "RSA");
    assert_eq!(published.use_, "sig");

    // 2. A token from the valid key names the published kid and verifies
    let token = server.request_token(false).await?;
    token
        .as_str()
        .assert_valid_jwt()
        .assert_signed_by(&published.kid)
        .assert_verifies_with(published);

    // 3. A token from the expired key has a good signature but is rejected
    //    on expiry
    let expired_token = server.request_token(true).await?;
    let expired_key = expired_jwk(&server).await?;
    assert_ne!(expired_key.kid, published.kid);

    expired_token
        .as_str()
        .assert_valid_jwt()
        .assert_signed_by(&expired_key.kid)
        .assert_expired()
        .assert_signature_valid_but_expired(&expired_key);

    Ok(())
}

#[tokio::test]
async fn test_expired_token_does_not_verify_against_published_key() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;
    let jwks = server.fetch_jwks().await?;

    let expired_token = server.request_token(true).await?;
    let key = jwks_test_utils::decoding_key_from_jwk(&jwks.keys[0])?;

    let mut signature_only = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::RS256);
    signature_only.validate_exp = false;
    let err = jsonwebtoken::decode::<serde_json::Value>(&expired_token, &key, &signature_only)
        .expect_err("expired key and published key are different key pairs");
    assert_eq!(
        err.kind(),
        &jsonwebtoken::errors::ErrorKind::InvalidSignature
    );

    Ok(())
}

#[tokio::test]
async fn test_stored_key_is_published_and_used() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;

    // Swap in a fixture key so the expected public half is known up front
    sqlx::query("UPDATE keys SET key = ? WHERE kid = ?")
        .bind(test_rsa_key_der(7)?)
        .bind(server.keys().valid_kid)
        .execute(server.pool())
        .await?;

    let fixture = test_rsa_key(7)?;
    let expected = crypto::public_key_components(&fixture);

    let jwks = server.fetch_jwks().await?;
    assert_eq!(jwks.keys[0].n, expected.n);
    assert_eq!(jwks.keys[0].e, expected.e);

    let token = server.request_token(false).await?;
    let key = decoding_key_from_private(&fixture)?;
    let verified = jsonwebtoken::decode::<serde_json::Value>(
        &token,
        &key,
        &jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::RS256),
    )?;
    assert!(verified.claims["exp"].as_i64().is_some());

    Ok(())
}

#[tokio::test]
async fn test_restart_replaces_keys() -> Result<(), anyhow::Error> {
    let first = TestJwksServer::spawn().await?;
    let second = TestJwksServer::spawn().await?;

    let first_jwks = first.fetch_jwks().await?;
    let second_jwks = second.fetch_jwks().await?;

    // Each start generates fresh key material but the same identifiers.
    assert_eq!(first_jwks.keys[0].kid, second_jwks.keys[0].kid);
    assert_ne!(first_jwks.keys[0].n, second_jwks.keys[0].n);

    Ok(())
}
