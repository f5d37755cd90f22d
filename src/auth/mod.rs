//! Authentication module for managing the bearer-token session.
//!
//! This module provides:
//! - `TokenStore`: file-backed storage for the single bearer credential
//! - `Claims`: signature-free JWT payload inspection (expiry only)
//! - `Session`: login/logout state machine over the store
//! - `gate`: pre-navigation guard for protected screens

pub mod claims;
pub mod gate;
pub mod session;
pub mod token;

pub use claims::Claims;
pub use session::Session;
pub use token::TokenStore;
