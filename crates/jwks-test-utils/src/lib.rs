//! # JWKS Test Utilities
//!
//! Shared test utilities for the JWKS service.
//!
//! This crate provides:
//! - Deterministic RSA fixtures (seeded keys for reproducible tests)
//! - Server test harness (TestJwksServer for E2E tests)
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jwks_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestJwksServer::spawn().await?;
//!     let jwks = server.fetch_jwks().await?;
//!     let token = server.request_token(false).await?;
//!
//!     token
//!         .assert_valid_jwt()
//!         .assert_signed_by(&jwks.keys[0].kid)
//!         .assert_verifies_with(&jwks.keys[0]);
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod crypto_fixtures;
pub mod server_harness;

// Re-export commonly used items
pub use assertions::*;
pub use crypto_fixtures::*;
pub use server_harness::*;
