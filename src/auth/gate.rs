//! Pre-navigation session gate.
//!
//! Protected screens are admitted only when both the in-memory session
//! and an independent re-read of the token store agree the credential is
//! still live. Either check failing sends the user back to the login
//! form, which also catches a token file cleared or swapped from outside
//! the running process.

use tracing::{debug, warn};

use super::claims::Claims;
use super::session::Session;

/// Returns true when navigation to a protected screen may proceed.
pub fn admit(session: &Session) -> bool {
    if !session.is_authenticated() {
        return false;
    }
    match session.store().get() {
        Ok(Some(token)) => match Claims::decode(&token) {
            Ok(claims) if !claims.is_expired() => true,
            Ok(_) => {
                debug!("Gate denied: stored token expired, discarding");
                if let Err(e) = session.store().remove() {
                    warn!(error = %e, "Could not discard the expired token");
                }
                false
            }
            Err(_) => {
                debug!("Gate denied: stored token unreadable");
                false
            }
        },
        Ok(None) => {
            debug!("Gate denied: no stored token");
            false
        }
        Err(e) => {
            debug!(error = %e, "Gate denied: token store unreadable");
            false
        }
    }
}
