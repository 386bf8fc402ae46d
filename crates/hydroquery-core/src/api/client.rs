//! Session client for the analytics query API.
//!
//! `SessionClient` owns the token cache. `ensure_token` hands out the cached
//! bearer token while it is valid and logs in again once it expires;
//! `run_query` posts a raw query string with that token attached.

use std::error::Error as _;
use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::token::DEFAULT_TOKEN_LIFETIME_SECS;
use crate::auth::{Credentials, TokenRecord};
use crate::config::EndpointConfig;

use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Endpoints in the config files carry no scheme; this one is assumed.
const DEFAULT_SCHEME: &str = "https";

#[derive(Debug, Deserialize)]
struct AuthResponse {
    auth_token: Option<AuthToken>,
}

#[derive(Debug, Deserialize)]
struct AuthToken {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

/// Where the token handed out by [`SessionClient::acquire_token`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Cached,
    Fetched,
}

/// Client for the token and query endpoints.
///
/// Every call takes `&mut self`, so at most one request is ever in flight
/// and the token cache needs no locking.
pub struct SessionClient {
    client: Client,
    endpoints: EndpointConfig,
    credentials: Credentials,
    token: TokenRecord,
    scheme: String,
}

impl SessionClient {
    pub fn new(endpoints: EndpointConfig, credentials: Credentials) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoints,
            credentials,
            token: TokenRecord::new(),
            scheme: DEFAULT_SCHEME.to_string(),
        })
    }

    /// Use another URL scheme (plain `http` for local stubs)
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn token_url(&self) -> String {
        format!("{}://{}", self.scheme, self.endpoints.token_endpoint)
    }

    pub fn query_url(&self) -> String {
        format!("{}://{}", self.scheme, self.endpoints.query_endpoint)
    }

    pub fn token_record(&self) -> &TokenRecord {
        &self.token
    }

    #[cfg(any(test, feature = "test-util"))]
    pub fn token_record_mut(&mut self) -> &mut TokenRecord {
        &mut self.token
    }

    /// Return the cached bearer token, fetching a new one if it is absent or expired.
    pub async fn ensure_token(&mut self) -> Result<String, ApiError> {
        let (token, _) = self.acquire_token().await?;
        Ok(token)
    }

    /// Like [`ensure_token`](Self::ensure_token), also reporting whether a login happened.
    pub async fn acquire_token(&mut self) -> Result<(String, TokenSource), ApiError> {
        if let Some(token) = self.token.token() {
            debug!("Using cached bearer token");
            return Ok((token.to_string(), TokenSource::Cached));
        }
        let token = self.fetch_token().await?;
        Ok((token, TokenSource::Fetched))
    }

    async fn fetch_token(&mut self) -> Result<String, ApiError> {
        let url = self.token_url();
        debug!(url = %url, username = self.credentials.username(), "Requesting bearer token");

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&self.credentials)
            .send()
            .await
            .map_err(|e| ApiError::AuthTransport(describe(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::AuthTransport(describe(&e)))?;

        if !status.is_success() {
            warn!(status = %status, "Token endpoint returned an error status");
            return Err(ApiError::AuthTransport(ApiError::status_detail(status, &body)));
        }

        // Parse fully before touching the cache so a bad response leaves it as it was
        let (token, lifetime_secs) = parse_auth_response(&body)?;
        self.token.update(token.clone(), lifetime_secs);
        info!(expires_in = lifetime_secs, "Obtained bearer token");
        Ok(token)
    }

    /// Run a query and return the parsed JSON response.
    ///
    /// The query string is sent verbatim as the request body.
    pub async fn run_query(&mut self, query: &str) -> Result<Value, ApiError> {
        let token = self.ensure_token().await?;
        self.send_query(&token, query).await
    }

    /// Post a query with a token the caller already holds.
    ///
    /// The token cache is not consulted, so this never logs in.
    pub async fn send_query(&self, token: &str, query: &str) -> Result<Value, ApiError> {
        let url = self.query_url();
        debug!(url = %url, bytes = query.len(), "Sending query");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(query.to_string())
            .send()
            .await
            .map_err(|e| ApiError::QueryTransport(describe(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::QueryTransport(describe(&e)))?;

        if status == StatusCode::BAD_REQUEST {
            warn!("Query endpoint rejected the query as a bad request");
            return Err(ApiError::BadQuery(body));
        }
        if !status.is_success() {
            warn!(status = %status, "Query endpoint returned an error status");
            return Err(ApiError::QueryTransport(ApiError::status_detail(status, &body)));
        }

        serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "query response is not JSON ({}): {}",
                e,
                ApiError::truncate_body(&body)
            ))
        })
    }
}

/// Pull `auth_token.access_token` and its lifetime out of a token response.
fn parse_auth_response(body: &str) -> Result<(String, i64), ApiError> {
    let malformed = || ApiError::MalformedAuthResponse(body.to_string());

    let parsed: AuthResponse = serde_json::from_str(body).map_err(|_| malformed())?;
    let auth_token = parsed.auth_token.ok_or_else(malformed)?;
    let access_token = auth_token.access_token.ok_or_else(malformed)?;
    let lifetime_secs = auth_token.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

    Ok((access_token, lifetime_secs))
}

/// reqwest's top-level message omits the cause; append the source chain.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
