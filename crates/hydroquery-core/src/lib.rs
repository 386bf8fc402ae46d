//! Core library for hydroquery.
//!
//! Loads endpoint and credential files, keeps a short-lived bearer token
//! cached in memory, and runs queries against the analytics query API.

pub mod api;
pub mod auth;
pub mod config;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use api::{ApiError, SessionClient, TokenSource};
pub use auth::{Credentials, TokenRecord};
pub use config::{load_credentials, load_properties, ConfigError, EndpointConfig};
