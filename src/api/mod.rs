//! REST API client module for the perfume store backend.
//!
//! `ApiClient` dispatches every request: base-URL joining, fresh bearer
//! injection from the token store, and `ApiError` normalization. The
//! `resource` module layers the per-screen read/create/update/delete
//! operations on top of it.

pub mod client;
pub mod envelope;
pub mod error;
pub mod resource;

#[cfg(test)]
pub mod testutil;

pub use client::ApiClient;
pub use envelope::Envelope;
pub use error::ApiError;
pub use resource::{CollectionQuery, CreateRequest, DeleteRequest, QueryOptions, UpdateRequest};
