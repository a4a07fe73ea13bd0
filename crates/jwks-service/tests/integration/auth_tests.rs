//! Integration tests for token issuance
//!
//! POST /auth with and without the `expired` flag.

use jwks_service::config::{Config, KeySelectionPolicy};
use jwks_test_utils::{unverified_claims, TokenAssertions, TestJwksServer};
use reqwest::StatusCode;

// ============================================================================
// Valid Key
// ============================================================================

#[tokio::test]
async fn test_auth_returns_bare_jwt() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;

    let response = reqwest::Client::new()
        .post(format!("{}/auth", server.url()))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"), "got {content_type}");

    let token = response.text().await?;
    assert_eq!(token.trim(), token, "body is the token and nothing else");
    token
        .as_str()
        .assert_valid_jwt()
        .assert_signed_by(&server.keys().valid_kid.to_string())
        .assert_not_expired();

    Ok(())
}

#[tokio::test]
async fn test_auth_exp_matches_stored_key_expiry() -> Result<(), anyhow::Error> {
    let before = chrono::Utc::now().timestamp();
    let server = TestJwksServer::spawn().await?;
    let lifetime = server.config().key_lifetime_seconds;

    let first = unverified_claims(&server.request_token(false).await?);
    let second = unverified_claims(&server.request_token(false).await?);

    // exp is copied from the key record, so every token from the same key
    // carries the same value.
    assert_eq!(first.exp, second.exp);
    assert!(first.exp >= before + lifetime);
    assert!(first.exp <= chrono::Utc::now().timestamp() + lifetime);

    Ok(())
}

// ============================================================================
// Expired Key
// ============================================================================

#[tokio::test]
async fn test_auth_expired_flag_uses_expired_key() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;

    let token = server.request_token(true).await?;
    token
        .as_str()
        .assert_valid_jwt()
        .assert_signed_by(&server.keys().expired_kid.to_string())
        .assert_expired();

    Ok(())
}

#[tokio::test]
async fn test_auth_truthy_flag_values() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;
    let client = reqwest::Client::new();
    let expired_kid = server.keys().expired_kid.to_string();

    for value in ["1", "t", "T", "true", "TRUE", "True"] {
        let token = client
            .post(format!("{}/auth?expired={}", server.url(), value))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        token.as_str().assert_signed_by(&expired_kid).assert_expired();
    }

    Ok(())
}

#[tokio::test]
async fn test_auth_falsy_flag_values_use_valid_key() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;
    let client = reqwest::Client::new();
    let valid_kid = server.keys().valid_kid.to_string();

    for query in ["expired=false", "expired=0", "expired=", "expired", "expired=yes"] {
        let token = client
            .post(format!("{}/auth?{}", server.url(), query))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        token
            .as_str()
            .assert_signed_by(&valid_kid)
            .assert_not_expired();
    }

    Ok(())
}

#[tokio::test]
async fn test_auth_key_id_policy_expired_request_uses_first_key() -> Result<(), anyhow::Error> {
    let config = Config {
        key_selection_policy: KeySelectionPolicy::KeyId,
        ..Config::default()
    };
    let server = TestJwksServer::spawn_with_config(config).await?;

    // Under identifier ordering `kid < 2` resolves to the first key, which is
    // the unexpired one.
    let token = server.request_token(true).await?;
    token.as_str().assert_signed_by("1").assert_not_expired();

    Ok(())
}

// ============================================================================
// Method Handling
// ============================================================================

#[tokio::test]
async fn test_auth_rejects_other_methods() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;
    let client = reqwest::Client::new();
    let url = format!("{}/auth", server.url());

    for method in [
        reqwest::Method::GET,
        reqwest::Method::PUT,
        reqwest::Method::PATCH,
        reqwest::Method::DELETE,
    ] {
        let response = client.request(method.clone(), &url).send().await?;
        assert_eq!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "{method} on /auth should be rejected"
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_auth_head_is_rejected() -> Result<(), anyhow::Error> {
    let server = TestJwksServer::spawn().await?;

    let response = reqwest::Client::new()
        .head(format!("{}/auth", server.url()))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    Ok(())
}
