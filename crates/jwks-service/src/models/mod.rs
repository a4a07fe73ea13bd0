use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Signing key record (maps to the `keys` table)
///
/// Debug is manually implemented so the private key bytes never reach logs.
#[derive(Clone, FromRow)]
pub struct KeyRecord {
    pub kid: i64,
    pub key: Vec<u8>, // PKCS#1 DER private key
    pub exp: i64,     // Expiration timestamp (Unix seconds)
}

impl KeyRecord {
    pub fn kid_string(&self) -> String {
        self.kid.to_string()
    }
}

impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRecord")
            .field("kid", &self.kid)
            .field("key", &"[REDACTED]")
            .field("exp", &self.exp)
            .finish()
    }
}

/// JWKS response (RFC 7517)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<JsonWebKey>,
}

/// JSON Web Key for an RSA signing key (RFC 7517, RFC 7518 §6.3)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub kid: String, // Key ID
    pub alg: String, // Algorithm ("RS256")
    pub kty: String, // Key Type ("RSA")
    #[serde(rename = "use")]
    pub use_: String, // Public key use ("sig")
    pub n: String,   // Modulus (base64url)
    pub e: String,   // Public exponent (base64url)
}
