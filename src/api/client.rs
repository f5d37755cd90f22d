//! Request dispatcher for the perfume store REST API.
//!
//! Every outbound request goes through `ApiClient`: it joins endpoint
//! paths onto the configured base URL, attaches the bearer credential
//! (read fresh from the token store each time), and normalizes transport
//! and response failures into `ApiError`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::TokenStore;

use super::envelope::{Envelope, LoginGrant};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Credential exchange endpoint. Joined without a leading slash so the
/// base URL's trailing slash is the only separator.
const LOGIN_ENDPOINT: &str = "auth/login";

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// Request dispatcher.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<TokenStore>,
}

impl ApiClient {
    /// Create a new dispatcher for the given base URL. The trailing slash
    /// is significant: endpoints are joined by plain concatenation.
    pub fn new(base_url: String, store: Arc<TokenStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url,
            store,
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Bearer injection. The store is read on every request so a token
    /// refreshed or cleared mid-session takes effect immediately; absence
    /// is not an error here - the server is the final arbiter.
    fn auth_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        match self.store.get() {
            Ok(Some(token)) => {
                match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                    Ok(value) => {
                        headers.insert(header::AUTHORIZATION, value);
                    }
                    Err(e) => warn!(error = %e, "Stored token is not a valid header value"),
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Could not read token store"),
        }
        headers
    }

    /// Read the body and parse the envelope, normalizing failures.
    async fn read_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Envelope<T>, ApiError> {
        let status = response.status();
        let text = response.text().await.map_err(ApiError::from)?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &text));
        }
        serde_json::from_str(&text).map_err(|e| {
            debug!(error = %e, "Envelope parse failed");
            ApiError::Validation(format!("Failed to parse server response: {}", e))
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Envelope<T>, ApiError> {
        let url = self.url(endpoint);
        debug!(url = %url, "GET");
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers())
            .send()
            .await
            .map_err(ApiError::from)?;
        Self::read_envelope(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Envelope<T>, ApiError> {
        let url = self.url(endpoint);
        debug!(url = %url, "POST");
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers())
            .json(body)
            .send()
            .await
            .map_err(ApiError::from)?;
        Self::read_envelope(response).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        id: i64,
        body: &B,
    ) -> Result<Envelope<T>, ApiError> {
        let url = format!("{}/{}", self.url(endpoint), id);
        debug!(url = %url, "PUT");
        let response = self
            .client
            .put(&url)
            .headers(self.auth_headers())
            .json(body)
            .send()
            .await
            .map_err(ApiError::from)?;
        Self::read_envelope(response).await
    }

    /// DELETE an element. The server may reply with an empty body; a body
    /// that is present but not an envelope is treated as diagnostic noise.
    pub async fn delete(
        &self,
        endpoint: &str,
        id: i64,
    ) -> Result<Option<Envelope<serde_json::Value>>, ApiError> {
        let url = format!("{}/{}", self.url(endpoint), id);
        debug!(url = %url, "DELETE");
        let response = self
            .client
            .delete(&url)
            .headers(self.auth_headers())
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        let text = response.text().await.map_err(ApiError::from)?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &text));
        }
        if text.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str(&text) {
            Ok(envelope) => Ok(Some(envelope)),
            Err(e) => {
                debug!(error = %e, "Ignoring unparseable delete response body");
                Ok(None)
            }
        }
    }

    /// Exchange credentials for a token grant. This is the one call built
    /// without the bearer header.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, ApiError> {
        let url = self.url(LOGIN_ENDPOINT);
        debug!(url = %url, "Login");
        let response = self
            .client
            .post(&url)
            .json(&LoginBody { email, password })
            .send()
            .await
            .map_err(ApiError::from)?;
        let envelope: Envelope<LoginGrant> = Self::read_envelope(response).await?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testutil::{StubResponse, StubServer};
    use crate::models::Brand;

    fn store_with(token: Option<&str>) -> (tempfile::TempDir, Arc<TokenStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().to_path_buf(), "desk_jwt").unwrap();
        if let Some(token) = token {
            store.set(token).unwrap();
        }
        (dir, Arc::new(store))
    }

    #[test]
    fn test_url_join_respects_trailing_slash() {
        let (_dir, store) = store_with(None);
        let api = ApiClient::new("http://localhost:3000/".to_string(), store).unwrap();
        assert_eq!(api.url("/brands"), "http://localhost:3000/brands");
        assert_eq!(api.url("auth/login"), "http://localhost:3000/auth/login");
    }

    #[test]
    fn test_auth_headers_reflect_store_contents() {
        let (_dir, store) = store_with(Some("tok-1"));
        let api = ApiClient::new("http://localhost/".to_string(), store.clone()).unwrap();
        let headers = api.auth_headers();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer tok-1");

        // Clearing the store takes effect on the next request
        store.remove().unwrap();
        assert!(api.auth_headers().get(header::AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_get_attaches_bearer_and_parses_envelope() {
        let body = r#"{"status":"success","message":"ok","data":[{"id":1,"name":"Chanel"}],"statusCode":200}"#;
        let server = StubServer::start(vec![StubResponse::json(200, body)]).await;
        let (_dir, store) = store_with(Some("tok-1"));
        let api = ApiClient::new(server.base_url(), store).unwrap();

        let envelope = api.get::<Vec<Brand>>("/brands").await.unwrap();
        assert_eq!(envelope.data.len(), 1);

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/brands");
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer tok-1"));
    }

    #[tokio::test]
    async fn test_non_success_surfaces_server_message() {
        let body = r#"{"status":"error","message":"Brand not found","data":null,"statusCode":404}"#;
        let server = StubServer::start(vec![StubResponse::json(404, body)]).await;
        let (_dir, store) = store_with(Some("tok-1"));
        let api = ApiClient::new(server.base_url(), store).unwrap();

        let err = api.get::<Vec<Brand>>("/brands").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Brand not found");
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_validation_error() {
        let server = StubServer::start(vec![StubResponse::json(200, "not json")]).await;
        let (_dir, store) = store_with(Some("tok-1"));
        let api = ApiClient::new(server.base_url(), store).unwrap();

        let err = api.get::<Vec<Brand>>("/brands").await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_login_posts_credentials_without_bearer() {
        let body = r#"{"status":"success","message":"welcome","data":{"access_token":"T1","exp":4102444800},"statusCode":200}"#;
        let server = StubServer::start(vec![StubResponse::json(200, body)]).await;
        let (_dir, store) = store_with(Some("stale-token"));
        let api = ApiClient::new(server.base_url(), store).unwrap();

        let grant = api.login("admin@store.com", "hunter2!A").await.unwrap();
        assert_eq!(grant.access_token, "T1");

        let requests = server.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/auth/login");
        assert!(requests[0].authorization.is_none());
        assert!(requests[0].body.contains(r#""email":"admin@store.com""#));
        assert!(requests[0].body.contains(r#""password":"hunter2!A""#));
    }

    #[tokio::test]
    async fn test_delete_tolerates_empty_body() {
        let server = StubServer::start(vec![StubResponse::json(200, "")]).await;
        let (_dir, store) = store_with(Some("tok-1"));
        let api = ApiClient::new(server.base_url(), store).unwrap();

        let body = api.delete("/brands", 5).await.unwrap();
        assert!(body.is_none());

        let requests = server.requests();
        assert_eq!(requests[0].method, "DELETE");
        assert_eq!(requests[0].path, "/brands/5");
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let (_dir, store) = store_with(None);
        // Port 9 (discard) is almost never listening
        let api = ApiClient::new("http://127.0.0.1:9/".to_string(), store).unwrap();
        let err = api.get::<Vec<Brand>>("/brands").await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
