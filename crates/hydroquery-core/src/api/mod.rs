//! HTTP client module for the analytics query API.
//!
//! This module provides the `SessionClient`, which trades the configured
//! credentials for a bearer token at the token endpoint and uses it to
//! post queries to the query endpoint.

pub mod client;
pub mod error;

pub use client::{SessionClient, TokenSource};
pub use error::ApiError;
