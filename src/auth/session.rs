use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::claims::Claims;
use super::token::{StoreError, TokenStore};

/// Session state machine over the token store.
///
/// Holds the credential plus its resolved expiry; the authenticated
/// predicate is recomputed on every call, never cached. The session itself
/// is never persisted: restarts rebuild it from whatever the store holds.
pub struct Session {
    store: Arc<TokenStore>,
    token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Build the initial session from the store. A stored token that is
    /// expired or unreadable is removed on the spot so later reads start
    /// clean.
    pub fn new(store: Arc<TokenStore>) -> Result<Self, StoreError> {
        let mut session = Self {
            store,
            token: None,
            expires_at: None,
        };
        if let Some(token) = session.store.get()? {
            match Claims::decode(&token) {
                Ok(claims) if !claims.is_expired() => {
                    debug!("Resuming stored session");
                    session.expires_at = claims.expires_at();
                    session.token = Some(token);
                }
                Ok(_) => {
                    debug!("Stored token has expired, discarding");
                    session.store.remove()?;
                }
                Err(e) => {
                    warn!(error = %e, "Stored token is unreadable, discarding");
                    session.store.remove()?;
                }
            }
        }
        Ok(session)
    }

    /// Establish a session from a fresh grant: persist the token and adopt
    /// its expiry. An explicit `expires_at` (from the login response) wins
    /// over the token's own claim, which covers tokens the client cannot
    /// decode.
    pub fn login(
        &mut self,
        token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        self.store.set(token)?;
        self.expires_at =
            expires_at.or_else(|| Claims::decode(token).ok().and_then(|c| c.expires_at()));
        self.token = Some(token.to_string());
        debug!("Session established");
        Ok(())
    }

    /// Tear the session down locally. The server is not notified.
    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.store.remove()?;
        self.token = None;
        self.expires_at = None;
        debug!("Session cleared");
        Ok(())
    }

    /// True iff a token is present and its expiry is still in the future
    /// at the moment of the call.
    pub fn is_authenticated(&self) -> bool {
        match (&self.token, self.expires_at) {
            (Some(_), Some(at)) => Utc::now() < at,
            _ => false,
        }
    }

    #[cfg(test)]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::Duration;

    fn make_token(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"42","exp":{}}}"#, exp));
        format!("{}.{}.sig", header, payload)
    }

    fn store() -> (tempfile::TempDir, Arc<TokenStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().to_path_buf(), "desk_jwt").unwrap();
        (dir, Arc::new(store))
    }

    #[test]
    fn test_resumes_valid_stored_token() {
        let (_dir, store) = store();
        let token = make_token(Utc::now().timestamp() + 3600);
        store.set(&token).unwrap();

        let session = Session::new(store).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some(token.as_str()));
    }

    #[test]
    fn test_expired_stored_token_is_discarded() {
        let (_dir, store) = store();
        store
            .set(&make_token(Utc::now().timestamp() - 60))
            .unwrap();

        let session = Session::new(store.clone()).unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_undecodable_stored_token_is_discarded() {
        let (_dir, store) = store();
        store.set("not-a-jwt").unwrap();

        let session = Session::new(store.clone()).unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_login_logout_round_trip() {
        let (_dir, store) = store();
        let mut session = Session::new(store.clone()).unwrap();
        assert!(!session.is_authenticated());

        let token = make_token(Utc::now().timestamp() + 3600);
        session.login(&token, None).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(store.get().unwrap().as_deref(), Some(token.as_str()));

        session.logout().unwrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_opaque_token_with_grant_expiry() {
        let (_dir, store) = store();
        let mut session = Session::new(store.clone()).unwrap();

        session
            .login("T1", Some(Utc::now() + Duration::hours(1)))
            .unwrap();
        assert!(session.is_authenticated());
        assert_eq!(store.get().unwrap().as_deref(), Some("T1"));
    }

    #[test]
    fn test_past_grant_expiry_is_not_authenticated() {
        let (_dir, store) = store();
        let mut session = Session::new(store).unwrap();

        session
            .login("T1", Some(Utc::now() - Duration::minutes(5)))
            .unwrap();
        assert!(session.token().is_some());
        assert!(!session.is_authenticated());
    }
}
