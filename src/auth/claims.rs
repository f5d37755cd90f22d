// Allow dead code: decoded claims carry fields for completeness
#![allow(dead_code)]

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Claims the client cares about from a JWT payload. Signatures are never
/// verified here; the server remains the authority on token validity, the
/// client only reads `exp` to avoid sending requests it knows will fail.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Expiry, epoch seconds.
    pub exp: i64,
}

impl Claims {
    /// Decode the payload segment of a JWT. Fails on anything that is not
    /// three dot-separated segments with a base64url JSON payload carrying
    /// `exp`; callers treat such tokens as unusable.
    pub fn decode(token: &str) -> Result<Self> {
        let payload = token
            .split('.')
            .nth(1)
            .context("token is not a JWT (missing payload segment)")?;
        // Trimming '=' tolerates both padded and unpadded encoders
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .context("token payload is not valid base64url")?;
        serde_json::from_slice(&bytes).context("token payload is not valid JSON")
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at() {
            Some(at) => Utc::now() >= at,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE;

    fn make_token(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"42","exp":{}}}"#, exp));
        format!("{}.{}.sig", header, payload)
    }

    #[test]
    fn test_decode_reads_expiry() {
        let exp = Utc::now().timestamp() + 3600;
        let claims = Claims::decode(&make_token(exp)).unwrap();
        assert_eq!(claims.exp, exp);
        assert_eq!(claims.sub.as_deref(), Some("42"));
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let claims = Claims::decode(&make_token(Utc::now().timestamp() - 60)).unwrap();
        assert!(claims.is_expired());
    }

    #[test]
    fn test_padded_payload_is_tolerated() {
        let header = URL_SAFE.encode(r#"{"alg":"HS256"}"#);
        let payload = URL_SAFE.encode(r#"{"exp": 4102444800}"#);
        let claims = Claims::decode(&format!("{}.{}.sig", header, payload)).unwrap();
        assert_eq!(claims.exp, 4102444800);
    }

    #[test]
    fn test_opaque_token_is_rejected() {
        assert!(Claims::decode("T1").is_err());
        assert!(Claims::decode("").is_err());
        assert!(Claims::decode("a.!!!.c").is_err());
    }

    #[test]
    fn test_payload_without_exp_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256"}"#);
        let payload = URL_SAFE_NO_PAD.encode(r#"{"sub":"42"}"#);
        assert!(Claims::decode(&format!("{}.{}.sig", header, payload)).is_err());
    }
}
