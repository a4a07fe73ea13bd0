//! RSA key handling and RS256 token signing.
//!
//! Private keys are persisted as PKCS#1 DER. The same bytes feed both the
//! `rsa` key object (public component extraction) and the `jsonwebtoken`
//! encoding key (signing).

use crate::errors::JwksError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rand::rngs::OsRng;
use rsa::{
    pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey},
    traits::PublicKeyParts,
    RsaPrivateKey,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// JWT claims carried by issued tokens.
///
/// `exp` is copied from the signing key's stored expiration, so a token signed
/// by the expired key is already expired when issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub exp: i64, // Expiration timestamp
    pub iat: i64, // Issued at timestamp
}

/// Public RSA components, base64url encoded without padding (RFC 7518 §6.3.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyComponents {
    pub n: String,
    pub e: String,
}

/// Generate an RSA private key using the OS CSPRNG.
///
/// CPU heavy; async callers should run this on the blocking pool.
#[instrument(skip_all, fields(bits = bits))]
pub fn generate_signing_key(bits: usize) -> Result<RsaPrivateKey, JwksError> {
    let mut rng = OsRng;
    RsaPrivateKey::new(&mut rng, bits)
        .map_err(|e| JwksError::KeyGeneration(format!("RSA key generation failed: {}", e)))
}

/// Encode a private key as PKCS#1 DER.
pub fn encode_private_key(private_key: &RsaPrivateKey) -> Result<Vec<u8>, JwksError> {
    let document = private_key
        .to_pkcs1_der()
        .map_err(|e| JwksError::MalformedKey(format!("PKCS#1 encoding failed: {}", e)))?;

    Ok(document.as_bytes().to_vec())
}

/// Decode a PKCS#1 DER private key.
///
/// Fails with `MalformedKey` for truncated, corrupted or non-PKCS#1 input.
pub fn decode_private_key(der: &[u8]) -> Result<RsaPrivateKey, JwksError> {
    RsaPrivateKey::from_pkcs1_der(der)
        .map_err(|e| JwksError::MalformedKey(format!("PKCS#1 decoding failed: {}", e)))
}

/// Extract the modulus and public exponent of a private key.
pub fn public_key_components(private_key: &RsaPrivateKey) -> PublicKeyComponents {
    PublicKeyComponents {
        n: URL_SAFE_NO_PAD.encode(private_key.n().to_bytes_be()),
        e: URL_SAFE_NO_PAD.encode(private_key.e().to_bytes_be()),
    }
}

/// Sign JWT with an RS256 private key
#[instrument(skip_all)]
pub fn sign_jwt(claims: &Claims, private_key_der: &[u8], key_id: &str) -> Result<String, JwksError> {
    // Validate the private key format
    let _private_key = decode_private_key(private_key_der)?;

    let encoding_key = EncodingKey::from_rsa_der(private_key_der);

    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some("JWT".to_string());
    header.kid = Some(key_id.to_string());

    let token = encode(&header, claims, &encoding_key)
        .map_err(|e| JwksError::Signing(format!("JWT signing operation failed: {}", e)))?;

    Ok(token)
}
