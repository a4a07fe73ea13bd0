//! Concurrent request handling
//!
//! The key store is immutable after startup, so concurrent issuance and
//! publication must always observe the same keys.

use jwks_test_utils::{unverified_claims, TestJwksServer, TokenAssertions};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_issuance_is_consistent() -> Result<(), anyhow::Error> {
    let server = Arc::new(TestJwksServer::spawn().await?);
    let keys = server.keys();

    let mut handles = Vec::new();
    for i in 0..20 {
        let server = Arc::clone(&server);
        handles.push(tokio::spawn(async move {
            let expired = i % 2 == 1;
            server.request_token(expired).await.map(|t| (expired, t))
        }));
    }

    let mut valid_exp = None;
    for handle in handles {
        let (expired, token) = handle.await??;
        if expired {
            token.as_str().assert_signed_by(&keys.expired_kid.to_string());
        } else {
            token.as_str().assert_signed_by(&keys.valid_kid.to_string());
            let exp = unverified_claims(&token).exp;
            assert_eq!(*valid_exp.get_or_insert(exp), exp);
        }
    }

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_publication_is_identical() -> Result<(), anyhow::Error> {
    let server = Arc::new(TestJwksServer::spawn().await?);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let server = Arc::clone(&server);
        handles.push(tokio::spawn(async move { server.fetch_jwks().await }));
    }

    let mut first = None;
    for handle in handles {
        let jwks = handle.await??;
        assert_eq!(jwks.keys.len(), 1);
        let expected = first.get_or_insert_with(|| jwks.clone());
        assert_eq!(*expected, jwks);
    }

    Ok(())
}
