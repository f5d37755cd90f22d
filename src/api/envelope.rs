// Allow dead code: the wire envelope carries fields for completeness
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::auth::Claims;

/// Uniform wrapper every backend reply uses. The payload lives in `data`;
/// `message` doubles as the user-facing text on failures.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: T,
    #[serde(rename = "statusCode", default)]
    pub status_code: i64,
}

/// Payload of the login envelope.
///
/// `access_token` is the authoritative field; `token` is accepted as an
/// alias because deployed backends have shipped both spellings. `exp`
/// (epoch seconds) covers grants whose token the client cannot decode.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginGrant {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl LoginGrant {
    /// Session expiry: the grant's own stamp when present, else whatever
    /// the token itself claims.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .or_else(|| {
                Claims::decode(&self.access_token)
                    .ok()
                    .and_then(|c| c.expires_at())
            })
    }
}
