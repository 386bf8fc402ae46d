use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Token request failed: {0}")]
    AuthTransport(String),

    #[error("Token response does not contain auth_token.access_token. Response received: {0}")]
    MalformedAuthResponse(String),

    #[error("Query request failed: {0}")]
    QueryTransport(String),

    /// HTTP 400 from the query endpoint, with the raw response body
    #[error("Query rejected with 400 Bad Request: {0}")]
    BadQuery(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Describe a non-success status and its body
    pub(crate) fn status_detail(status: reqwest::StatusCode, body: &str) -> String {
        format!("Status {}: {}", status, Self::truncate_body(body))
    }

    /// Whether this is the 400 case that deserves a syntax hint
    pub fn is_bad_query(&self) -> bool {
        matches!(self, ApiError::BadQuery(_))
    }
}
