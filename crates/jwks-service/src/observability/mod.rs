//! Observability for the JWKS service
//!
//! Handlers and services use `#[instrument(skip_all)]` with explicit safe
//! fields. Key ids, expirations and outcomes may be logged; private key
//! bytes and issued tokens never are.

pub mod metrics;

pub use metrics::{record_jwks_request, record_key_generated, record_token_issuance};

/// Label value for a key selection
pub fn key_state(want_expired: bool) -> &'static str {
    if want_expired {
        "expired"
    } else {
        "valid"
    }
}
