//! Loading of the two `KEY=VALUE` configuration files.
//!
//! The properties file names the endpoints (`TOKEN_ENDPOINT`, `QUERY_ENDPOINT`)
//! and the secret file carries the login (`USERNAME`, `PASSWORD`). Both are
//! read once at startup; nothing here is retried.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::auth::Credentials;

/// Default properties file, relative to the working directory
pub const DEFAULT_PROPERTIES_FILE: &str = "properties";

/// Default credentials file, relative to the working directory
pub const DEFAULT_SECRET_FILE: &str = ".secret";

pub const TOKEN_ENDPOINT_KEY: &str = "TOKEN_ENDPOINT";
pub const QUERY_ENDPOINT_KEY: &str = "QUERY_ENDPOINT";
pub const USERNAME_KEY: &str = "USERNAME";
pub const PASSWORD_KEY: &str = "PASSWORD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Config file {} is missing required key {key}", .path.display())]
    ConfigIncomplete { path: PathBuf, key: String },

    #[error("Failed to read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Endpoint hosts, without scheme. Both fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub token_endpoint: String,
    pub query_endpoint: String,
}

/// Load the endpoint properties file.
pub fn load_properties(path: impl AsRef<Path>) -> Result<EndpointConfig, ConfigError> {
    let path = path.as_ref();
    let values = load_key_values(path)?;
    Ok(EndpointConfig {
        token_endpoint: require(&values, path, TOKEN_ENDPOINT_KEY)?,
        query_endpoint: require(&values, path, QUERY_ENDPOINT_KEY)?,
    })
}

/// Load the credentials file.
pub fn load_credentials(path: impl AsRef<Path>) -> Result<Credentials, ConfigError> {
    let path = path.as_ref();
    let values = load_key_values(path)?;
    Ok(Credentials::new(
        require(&values, path, USERNAME_KEY)?,
        require(&values, path, PASSWORD_KEY)?,
    ))
}

/// Read a file and parse it with [`parse_key_values`].
pub fn load_key_values(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let values = parse_key_values(&contents);
    debug!(path = %path.display(), keys = values.len(), "Loaded config file");
    Ok(values)
}

/// Parse `KEY=VALUE` lines.
///
/// Lines are trimmed; blank lines, `#` comments and lines without `=` are
/// skipped. Only the first `=` splits, so values may contain `=`. A repeated
/// key keeps its last value.
pub fn parse_key_values(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

fn require(
    values: &HashMap<String, String>,
    path: &Path,
    key: &str,
) -> Result<String, ConfigError> {
    match values.get(key) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err(ConfigError::ConfigIncomplete {
            path: path.to_path_buf(),
            key: key.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn test_parse_key_values() {
        let values = parse_key_values("A=1\nnot a pair\n\n  B = two  \nC=x=y\n");
        assert_eq!(values.len(), 3);
        assert_eq!(values["A"], "1");
        assert_eq!(values["B"], "two");
        assert_eq!(values["C"], "x=y"); // only the first '=' splits
    }

    #[test]
    fn test_parse_key_values_last_duplicate_wins() {
        let values = parse_key_values("A=first\nA=second\n");
        assert_eq!(values["A"], "second");
    }

    #[test]
    fn test_parse_key_values_skips_comments() {
        let values = parse_key_values("# TOKEN_ENDPOINT=old.example.com\nTOKEN_ENDPOINT=new.example.com\r\n");
        assert_eq!(values.len(), 1);
        assert_eq!(values["TOKEN_ENDPOINT"], "new.example.com");
    }

    #[test]
    fn test_load_properties() {
        let file = write_temp("TOKEN_ENDPOINT=auth.example.com\nQUERY_ENDPOINT=query.example.com\n");
        let config = load_properties(file.path()).expect("properties should load");
        assert_eq!(config.token_endpoint, "auth.example.com");
        assert_eq!(config.query_endpoint, "query.example.com");
    }

    #[test]
    fn test_load_credentials() {
        let file = write_temp("USERNAME=bob   \nPASSWORD=secret\n");
        let creds = load_credentials(file.path()).expect("credentials should load");
        assert_eq!(creds.username(), "bob");
        assert_eq!(creds.password(), "secret");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("properties");
        let err = load_properties(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigNotFound(ref p) if p == &path));

        let err = load_credentials(dir.path().join(".secret")).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigNotFound(_)));
    }

    #[test]
    fn test_missing_key_is_incomplete() {
        let file = write_temp("TOKEN_ENDPOINT=auth.example.com\n");
        let err = load_properties(file.path()).unwrap_err();
        match err {
            ConfigError::ConfigIncomplete { key, .. } => assert_eq!(key, QUERY_ENDPOINT_KEY),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_value_is_incomplete() {
        let file = write_temp("USERNAME=bob\nPASSWORD=\n");
        let err = load_credentials(file.path()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ConfigIncomplete { ref key, .. } if key == PASSWORD_KEY
        ));
        assert!(err.to_string().contains("PASSWORD"));
    }
}
