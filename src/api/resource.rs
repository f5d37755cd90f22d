//! Resource access operations.
//!
//! Screens talk to the backend through four primitives: a read-collection
//! query plus create, update and delete requests. Every instance owns its
//! `{loading, error}` status pair and, for queries, a private completion
//! channel - overlapping operations on different screens never share
//! state, and there is no global request registry.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::auth::Session;

use super::client::ApiClient;
use super::ApiError;

/// Completion channel depth. A query rarely has more than one request in
/// flight; eight queued completions is already pathological.
const COMPLETION_BUFFER: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    /// When true (the default), refetch refuses to dispatch without a
    /// live session and reports the failure immediately.
    pub requires_auth: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            requires_auth: true,
        }
    }
}

type Completion<T> = (u64, Result<Vec<T>, ApiError>);

/// Read-collection operation.
///
/// `data` holds the payload of the most recent settled read and survives
/// later failures; screens mirror it into their row vectors. Completions
/// are applied in arrival order. Each `refetch` advances a generation
/// counter and completions from superseded invocations are discarded, so
/// the displayed outcome always belongs to the newest invocation.
pub struct CollectionQuery<T> {
    api: ApiClient,
    endpoint: String,
    options: QueryOptions,
    pub data: Option<Vec<T>>,
    pub loading: bool,
    pub error: Option<String>,
    generation: u64,
    tx: mpsc::Sender<Completion<T>>,
    rx: mpsc::Receiver<Completion<T>>,
}

impl<T: DeserializeOwned + Send + 'static> CollectionQuery<T> {
    pub fn new(api: ApiClient, endpoint: impl Into<String>, options: QueryOptions) -> Self {
        let (tx, rx) = mpsc::channel(COMPLETION_BUFFER);
        Self {
            api,
            endpoint: endpoint.into(),
            options,
            data: None,
            loading: false,
            error: None,
            generation: 0,
            tx,
            rx,
        }
    }

    /// Dispatch a read. Re-invoking before the previous request settles
    /// resets the status fields and supersedes it without cancelling; the
    /// old completion is dropped when it eventually arrives.
    pub fn refetch(&mut self, session: &Session) {
        self.generation += 1;

        if self.options.requires_auth && !session.is_authenticated() {
            debug!(endpoint = %self.endpoint, "Refetch refused: no session");
            self.loading = false;
            self.error = Some(ApiError::NoSession.to_string());
            return;
        }

        self.loading = true;
        self.error = None;

        let generation = self.generation;
        let api = self.api.clone();
        let endpoint = self.endpoint.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.get::<Vec<T>>(&endpoint).await.map(|env| env.data);
            if tx.send((generation, result)).await.is_err() {
                debug!(endpoint = %endpoint, "Query dropped before its completion arrived");
            }
        });
    }

    /// Drain completions in arrival order, newest state winning. Returns
    /// true when anything was applied (the screen should repaint).
    pub fn poll(&mut self) -> bool {
        let mut applied = false;
        while let Ok((generation, result)) = self.rx.try_recv() {
            if generation != self.generation {
                debug!(
                    endpoint = %self.endpoint,
                    generation,
                    current = self.generation,
                    "Ignoring completion of superseded invocation"
                );
                continue;
            }
            self.loading = false;
            match result {
                Ok(rows) => {
                    self.data = Some(rows);
                    self.error = None;
                }
                Err(e) => {
                    warn!(endpoint = %self.endpoint, error = %e, "Collection read failed");
                    self.error = Some(e.to_string());
                }
            }
            applied = true;
        }
        applied
    }

    /// True once any invocation happened, including refused ones.
    pub fn started(&self) -> bool {
        self.generation > 0
    }

    #[cfg(test)]
    fn inject(&mut self, generation: u64, result: Result<Vec<T>, ApiError>) {
        self.tx.try_send((generation, result)).unwrap();
    }
}

/// Create operation for POST {endpoint}. Returns the server-confirmed
/// record and never touches any row collection itself.
pub struct CreateRequest<T> {
    api: ApiClient,
    endpoint: String,
    pub loading: bool,
    pub error: Option<String>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> CreateRequest<T> {
    pub fn new(api: ApiClient, endpoint: impl Into<String>) -> Self {
        Self {
            api,
            endpoint: endpoint.into(),
            loading: false,
            error: None,
            _marker: std::marker::PhantomData,
        }
    }

    /// Failures set the error field AND propagate, so callers can render
    /// the field or match on the returned error, whichever fits.
    pub async fn create<B: Serialize + ?Sized>(&mut self, payload: &B) -> Result<T, ApiError> {
        self.loading = true;
        self.error = None;
        let result = self.api.post::<T, B>(&self.endpoint, payload).await;
        self.loading = false;
        match result {
            Ok(envelope) => Ok(envelope.data),
            Err(e) => {
                warn!(endpoint = %self.endpoint, error = %e, "Create failed");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

/// Update operation for PUT {endpoint}/{id} with a partial payload.
pub struct UpdateRequest<T> {
    api: ApiClient,
    endpoint: String,
    pub loading: bool,
    pub error: Option<String>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> UpdateRequest<T> {
    pub fn new(api: ApiClient, endpoint: impl Into<String>) -> Self {
        Self {
            api,
            endpoint: endpoint.into(),
            loading: false,
            error: None,
            _marker: std::marker::PhantomData,
        }
    }

    pub async fn update<B: Serialize + ?Sized>(
        &mut self,
        id: i64,
        patch: &B,
    ) -> Result<T, ApiError> {
        self.loading = true;
        self.error = None;
        let result = self.api.put::<T, B>(&self.endpoint, id, patch).await;
        self.loading = false;
        match result {
            Ok(envelope) => Ok(envelope.data),
            Err(e) => {
                warn!(endpoint = %self.endpoint, id, error = %e, "Update failed");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

/// Delete operation for DELETE {endpoint}/{id}.
pub struct DeleteRequest {
    api: ApiClient,
    endpoint: String,
    pub loading: bool,
    pub error: Option<String>,
}

impl DeleteRequest {
    pub fn new(api: ApiClient, endpoint: impl Into<String>) -> Self {
        Self {
            api,
            endpoint: endpoint.into(),
            loading: false,
            error: None,
        }
    }

    /// The error field gets a generic message; callers that care about the
    /// business reason (dependent records and the like) match on the
    /// returned error's status instead.
    pub async fn delete(
        &mut self,
        id: i64,
    ) -> Result<Option<crate::api::Envelope<serde_json::Value>>, ApiError> {
        self.loading = true;
        self.error = None;
        let result = self.api.delete(&self.endpoint, id).await;
        self.loading = false;
        match result {
            Ok(body) => Ok(body),
            Err(e) => {
                warn!(endpoint = %self.endpoint, id, error = %e, "Delete failed");
                self.error = Some("Failed to delete the record".to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testutil::{StubResponse, StubServer};
    use crate::auth::TokenStore;
    use crate::models::{Brand, BrandPatch, NewBrand};
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn harness(base_url: String, logged_in: bool) -> (tempfile::TempDir, ApiClient, Session) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(TokenStore::new(dir.path().to_path_buf(), "desk_jwt").unwrap());
        let api = ApiClient::new(base_url, store.clone()).unwrap();
        let mut session = Session::new(store).unwrap();
        if logged_in {
            session
                .login("tok-1", Some(Utc::now() + Duration::hours(1)))
                .unwrap();
        }
        (dir, api, session)
    }

    fn brands_body(rows: &str) -> String {
        format!(
            r#"{{"status":"success","message":"ok","data":{},"statusCode":200}}"#,
            rows
        )
    }

    async fn settle(query: &mut CollectionQuery<Brand>) {
        for _ in 0..400 {
            if query.poll() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("query never settled");
    }

    #[tokio::test]
    async fn test_refetch_populates_data() {
        let body = brands_body(r#"[{"id":1,"name":"Chanel"},{"id":2,"name":"Dior"}]"#);
        let server = StubServer::start(vec![StubResponse::json(200, body)]).await;
        let (_dir, api, session) = harness(server.base_url(), true);

        let mut query: CollectionQuery<Brand> =
            CollectionQuery::new(api, "/brands", QueryOptions::default());
        query.refetch(&session);
        assert!(query.loading);

        settle(&mut query).await;
        assert!(!query.loading);
        assert!(query.error.is_none());
        assert_eq!(query.data.as_ref().unwrap().len(), 2);
        assert_eq!(server.requests()[0].authorization.as_deref(), Some("Bearer tok-1"));
    }

    #[tokio::test]
    async fn test_requires_auth_fails_fast_without_dispatch() {
        let server = StubServer::start(vec![]).await;
        let (_dir, api, session) = harness(server.base_url(), false);

        let mut query: CollectionQuery<Brand> =
            CollectionQuery::new(api, "/brands", QueryOptions::default());
        query.refetch(&session);

        assert!(!query.loading);
        assert_eq!(query.error.as_deref(), Some("No active session"));

        // Give a mistakenly-dispatched request time to show up
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_last_data() {
        let ok = brands_body(r#"[{"id":1,"name":"Chanel"}]"#);
        let err = r#"{"status":"error","message":"boom","data":null,"statusCode":500}"#;
        let server = StubServer::start(vec![
            StubResponse::json(200, ok),
            StubResponse::json(500, err),
        ])
        .await;
        let (_dir, api, session) = harness(server.base_url(), true);

        let mut query: CollectionQuery<Brand> =
            CollectionQuery::new(api, "/brands", QueryOptions::default());
        query.refetch(&session);
        settle(&mut query).await;
        assert_eq!(query.data.as_ref().unwrap().len(), 1);

        query.refetch(&session);
        assert!(query.loading);
        assert!(query.error.is_none());
        settle(&mut query).await;
        assert_eq!(query.error.as_deref(), Some("boom"));
        // Last settled rows survive the failure
        assert_eq!(query.data.as_ref().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_superseded_completion_is_ignored_when_it_resolves_last() {
        let stale = brands_body(r#"[{"id":1,"name":"Stale"}]"#);
        let fresh = brands_body(r#"[{"id":2,"name":"Fresh"}]"#);
        let server = StubServer::start(vec![
            StubResponse::delayed(200, stale, std::time::Duration::from_millis(400)),
            StubResponse::json(200, fresh),
        ])
        .await;
        let (_dir, api, session) = harness(server.base_url(), true);

        let mut query: CollectionQuery<Brand> =
            CollectionQuery::new(api, "/brands", QueryOptions::default());
        query.refetch(&session);
        // Let the first request reach the stub before superseding it
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        query.refetch(&session);

        settle(&mut query).await;
        assert_eq!(query.data.as_ref().unwrap()[0].name, "Fresh");

        // The superseded response arrives afterwards and must not win
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        query.poll();
        assert_eq!(query.data.as_ref().unwrap()[0].name, "Fresh");
        assert!(!query.loading);
        assert!(query.error.is_none());
    }

    #[tokio::test]
    async fn test_completions_of_current_generation_apply_in_arrival_order() {
        let (_dir, api, _session) = harness("http://localhost:1/".to_string(), true);
        let mut query: CollectionQuery<Brand> =
            CollectionQuery::new(api, "/brands", QueryOptions::default());

        let first = Brand {
            id: 1,
            name: "First".to_string(),
            logo: None,
        };
        let second = Brand {
            id: 2,
            name: "Second".to_string(),
            logo: None,
        };
        query.inject(0, Ok(vec![first]));
        query.inject(0, Ok(vec![second]));

        assert!(query.poll());
        assert_eq!(query.data.as_ref().unwrap()[0].name, "Second");

        // An error arriving after a success also wins
        query.inject(0, Err(ApiError::Network("reset".into())));
        query.poll();
        assert!(query.error.as_deref().unwrap().contains("reset"));
    }

    #[tokio::test]
    async fn test_create_returns_confirmed_record() {
        let body = r#"{"status":"success","message":"created","data":{"id":9,"name":"Guerlain"},"statusCode":201}"#;
        let server = StubServer::start(vec![StubResponse::json(201, body)]).await;
        let (_dir, api, _session) = harness(server.base_url(), true);

        let mut create: CreateRequest<Brand> = CreateRequest::new(api, "/brands");
        let record = create
            .create(&NewBrand {
                name: "Guerlain".to_string(),
                logo: None,
            })
            .await
            .unwrap();
        assert_eq!(record.id, 9);
        assert!(!create.loading);
        assert!(create.error.is_none());

        let requests = server.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/brands");
        assert!(requests[0].body.contains(r#""name":"Guerlain""#));
    }

    #[tokio::test]
    async fn test_create_failure_sets_field_and_propagates() {
        let body = r#"{"status":"error","message":"Name already exists","data":null,"statusCode":400}"#;
        let server = StubServer::start(vec![StubResponse::json(400, body)]).await;
        let (_dir, api, _session) = harness(server.base_url(), true);

        let mut create: CreateRequest<Brand> = CreateRequest::new(api, "/brands");
        let err = create
            .create(&NewBrand {
                name: "Chanel".to_string(),
                logo: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(create.error.as_deref(), Some("Name already exists"));
    }

    #[tokio::test]
    async fn test_update_puts_to_id_path() {
        let body = r#"{"status":"success","message":"updated","data":{"id":5,"name":"Dior"},"statusCode":200}"#;
        let server = StubServer::start(vec![StubResponse::json(200, body)]).await;
        let (_dir, api, _session) = harness(server.base_url(), true);

        let mut update: UpdateRequest<Brand> = UpdateRequest::new(api, "/brands");
        let record = update
            .update(
                5,
                &BrandPatch {
                    name: Some("Dior".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(record.id, 5);

        let requests = server.requests();
        assert_eq!(requests[0].method, "PUT");
        assert_eq!(requests[0].path, "/brands/5");
        assert_eq!(requests[0].body, r#"{"name":"Dior"}"#);
    }

    #[tokio::test]
    async fn test_delete_error_keeps_generic_field_and_real_status() {
        let body = r#"{"status":"error","message":"Perfume has inventory attached","data":null,"statusCode":400}"#;
        let server = StubServer::start(vec![StubResponse::json(400, body)]).await;
        let (_dir, api, _session) = harness(server.base_url(), true);

        let mut delete = DeleteRequest::new(api, "/perfumes");
        let err = delete.delete(7).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "Perfume has inventory attached");
        assert_eq!(delete.error.as_deref(), Some("Failed to delete the record"));

        let requests = server.requests();
        assert_eq!(requests[0].method, "DELETE");
        assert_eq!(requests[0].path, "/perfumes/7");
    }
}
