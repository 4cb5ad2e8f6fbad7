//! RS256 assertion (JWT) generation for GitHub App authentication.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{Algorithm, EncodingKey};
use serde::Serialize;

use crate::error::{Error, Result};

/// Assertion lifetime in seconds.
pub const ASSERTION_TTL: u64 = 300;

#[derive(Serialize)]
struct AssertionHeader {
    alg: &'static str,
    typ: &'static str,
}

const HEADER: AssertionHeader = AssertionHeader {
    alg: "RS256",
    typ: "JWT",
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    pub iat: u64,
    pub exp: u64,
    pub iss: String,
}

impl Claims {
    pub fn new(app_id: u64, now: u64) -> Self {
        Self {
            iat: now,
            exp: now + ASSERTION_TTL,
            iss: app_id.to_string(),
        }
    }
}

/// URL-safe base64 without padding.
pub fn base64url(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value).map_err(|e| Error::Signing(e.into()))?;
    Ok(base64url(json))
}

/// Sign `claims` with a PEM-encoded RSA private key.
pub fn sign_assertion(private_key: &str, claims: &Claims) -> Result<String> {
    let key = EncodingKey::from_rsa_pem(private_key.as_bytes()).map_err(Error::Signing)?;

    let signing_input = format!("{}.{}", encode_segment(&HEADER)?, encode_segment(claims)?);
    let signature = jsonwebtoken::crypto::sign(signing_input.as_bytes(), &key, Algorithm::RS256)
        .map_err(Error::Signing)?;

    Ok(format!("{signing_input}.{signature}"))
}

/// Generate a short-lived assertion for `app_id`, issued now.
pub fn generate_assertion(app_id: u64, private_key: &str) -> Result<String> {
    let now = unix_time(SystemTime::now())?;
    sign_assertion(private_key, &Claims::new(app_id, now))
}

fn unix_time(at: SystemTime) -> Result<u64> {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(Error::Clock)
}
