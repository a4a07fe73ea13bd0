use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JwksError {
    /// Stored key bytes are not a valid PKCS#1 RSA private key.
    #[error("Malformed key: {0}")]
    MalformedKey(String),

    #[error("Store write error: {0}")]
    StoreWrite(String),

    #[error("Store read error: {0}")]
    StoreRead(String),

    /// Selection matched no record; the store was not bootstrapped.
    #[error("No {0} signing key available")]
    KeyNotFound(&'static str),

    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    #[error("Signing error: {0}")]
    Signing(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for JwksError {
    fn into_response(self) -> Response {
        // Every core failure is a server-side fault. Details go to the log only.
        tracing::error!(target: "jwks.errors", error = %self, "Request failed");

        let (code, message) = match &self {
            JwksError::MalformedKey(_) => ("MALFORMED_KEY", "Stored signing key is unreadable"),
            JwksError::StoreWrite(_) | JwksError::StoreRead(_) => {
                ("STORE_ERROR", "An internal storage error occurred")
            }
            JwksError::KeyNotFound(_) => ("KEY_NOT_FOUND", "No signing key is available"),
            JwksError::KeyGeneration(_) | JwksError::Signing(_) => {
                ("CRYPTO_ERROR", "An internal cryptographic error occurred")
            }
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: message.to_string(),
            },
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)).into_response()
    }
}
