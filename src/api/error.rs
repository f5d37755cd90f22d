use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Raised locally before dispatch when an operation requires a live
    /// session and none exists. Never produced by the server.
    #[error("No active session")]
    NoSession,

    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Validation(String),

    #[error("{0}")]
    Unknown(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data. The cut
    /// must land on a char boundary; server messages are not ASCII-only.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..end],
            body.len()
        )
    }

    /// Build the error for a non-2xx response. The server wraps failures in
    /// its standard envelope; the envelope `message` is the text users
    /// should see, with the raw body as fallback when it does not parse.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        #[derive(serde::Deserialize)]
        struct ErrorEnvelope {
            message: String,
        }

        let code = status.as_u16();
        let message = match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) if !envelope.message.trim().is_empty() => envelope.message,
            _ if body.trim().is_empty() => format!("Request failed with status {}", code),
            _ => format!("Status {}: {}", code, Self::truncate_body(body)),
        };
        ApiError::Http {
            status: code,
            message,
        }
    }

    /// HTTP status for business-rule checks; None for errors raised before
    /// or below the HTTP layer.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            ApiError::Network(e.to_string())
        } else if e.is_decode() {
            ApiError::Validation(e.to_string())
        } else {
            ApiError::Unknown(e.to_string())
        }
    }
}
