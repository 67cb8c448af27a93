//! Access-token payload decoding.
//!
//! # Purpose and responsibility
//! Decodes a bearer token's payload into a structured claim set. This is a
//! pure decode: no signature or expiry validation happens here, upstream
//! infrastructure is trusted to have validated the token before it reaches
//! this service.
//!
//! # Where it fits in Atrium
//! The HTTP layer decodes incoming bearer tokens to attach the caller's
//! subject to request spans; nothing in this module grants access.
//!
//! # Key invariants and assumptions
//! - Malformed input yields a decode error, never a partially populated
//!   payload.
//! - Claims pass through unchanged; `sub`, `roles`, and `exp` are exactly
//!   what the token carries.
//!
//! # Security considerations
//! - Do not use this module to make authorization decisions on its own; it
//!   deliberately skips signature verification.
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by an upstream-issued access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessTokenPayload {
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenDecodeError {
    #[error("malformed access token: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
}

/// Decode a bearer token's payload without validating it.
///
/// # What it does
/// Parses the JWT structure and deserializes the payload into
/// [`AccessTokenPayload`].
///
/// # Errors
/// - [`TokenDecodeError::Malformed`] when the token is not a well-formed
///   JWT or the payload is missing required claims.
pub fn decode_access_token(token: &str) -> Result<AccessTokenPayload, TokenDecodeError> {
    // Signature and expiry checks are explicitly disabled: this layer trusts
    // upstream validation and only extracts the claim set.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    let data = jsonwebtoken::decode::<AccessTokenPayload>(
        token,
        &DecodingKey::from_secret(&[]),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn unsigned_token(payload: serde_json::Value) -> String {
        // Hand-rolled JWT with a junk signature: the decoder must accept it
        // because it never verifies signatures.
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(b"junk");
        format!("{header}.{payload}.{signature}")
    }

    #[test]
    fn decodes_well_formed_payload_unchanged() {
        let token = unsigned_token(serde_json::json!({
            "sub": "user-1",
            "roles": ["admin", "editor"],
            "exp": 1_900_000_000i64,
        }));
        let payload = decode_access_token(&token).expect("decode");
        assert_eq!(payload.sub, "user-1");
        assert_eq!(payload.roles, vec!["admin", "editor"]);
        assert_eq!(payload.exp, 1_900_000_000);
    }

    #[test]
    fn roles_claim_defaults_to_empty() {
        let token = unsigned_token(serde_json::json!({
            "sub": "user-2",
            "exp": 1_900_000_000i64,
        }));
        let payload = decode_access_token(&token).expect("decode");
        assert!(payload.roles.is_empty());
    }

    #[test]
    fn expired_tokens_still_decode() {
        // Expiry enforcement belongs upstream; the decode is pure.
        let token = unsigned_token(serde_json::json!({
            "sub": "user-3",
            "roles": [],
            "exp": 1i64,
        }));
        let payload = decode_access_token(&token).expect("decode");
        assert_eq!(payload.exp, 1);
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(decode_access_token("not-a-token").is_err());
        assert!(decode_access_token("a.b").is_err());
        assert!(decode_access_token("!!!.###.$$$").is_err());
    }

    #[test]
    fn missing_required_claims_are_rejected() {
        let token = unsigned_token(serde_json::json!({
            "roles": ["admin"],
            "exp": 1_900_000_000i64,
        }));
        assert!(decode_access_token(&token).is_err());
    }
}
