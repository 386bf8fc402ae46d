//! Authentication state for the query API.
//!
//! This module provides:
//! - `Credentials`: the username/password pair exchanged for a token
//! - `TokenRecord`: the in-memory bearer token cache with its expiry
//!
//! Tokens are never persisted; a record lives as long as its client.

pub mod credentials;
pub mod token;

pub use credentials::Credentials;
pub use token::TokenRecord;
