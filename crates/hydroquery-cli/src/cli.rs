//! Argument parsing and action dispatch.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use hydroquery_core::config::{DEFAULT_PROPERTIES_FILE, DEFAULT_SECRET_FILE};
use hydroquery_core::{load_credentials, load_properties, ApiError, SessionClient, TokenSource};

const BAD_REQUEST_HINT: &str =
    "Error 400 - Bad Request: check the query syntax and the parameters sent.";

#[derive(Parser, Debug)]
#[command(name = "hydroquery")]
#[command(about = "Get a bearer token or run a query against the analytics query API")]
#[command(version)]
pub struct Args {
    /// Either generate a token or run a query
    #[arg(value_enum)]
    pub action: Action,

    /// SQL query to run (required for run_query)
    #[arg(long)]
    pub query: Option<String>,

    /// Properties file with TOKEN_ENDPOINT and QUERY_ENDPOINT
    #[arg(long, env = "HYDROQUERY_PROPERTIES", default_value = DEFAULT_PROPERTIES_FILE)]
    pub properties: PathBuf,

    /// Credentials file with USERNAME and PASSWORD
    #[arg(long, env = "HYDROQUERY_SECRET", default_value = DEFAULT_SECRET_FILE)]
    pub secret: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    #[value(name = "get_token")]
    GetToken,
    #[value(name = "run_query")]
    RunQuery,
}

/// Load both config files, build the client and perform the requested action.
pub async fn run<W: Write>(args: &Args, out: &mut W) -> Result<()> {
    // Checked before any file or network access
    if args.action == Action::RunQuery && args.query.as_deref().map_or(true, str::is_empty) {
        bail!("the --query option is required to run a query");
    }

    let endpoints = load_properties(&args.properties)?;
    let credentials = load_credentials(&args.secret)?;
    debug!(
        token_endpoint = %endpoints.token_endpoint,
        query_endpoint = %endpoints.query_endpoint,
        "Loaded configuration"
    );

    let mut client =
        SessionClient::new(endpoints, credentials).context("Failed to initialise HTTP client")?;
    execute(args.action, args.query.as_deref(), &mut client, out).await
}

/// Perform one action with an existing client.
pub async fn execute<W: Write>(
    action: Action,
    query: Option<&str>,
    client: &mut SessionClient,
    out: &mut W,
) -> Result<()> {
    match action {
        Action::GetToken => {
            let (token, source) = client.acquire_token().await?;
            if source == TokenSource::Fetched {
                writeln!(out, "Token obtained successfully!")?;
            }
            writeln!(out, "Token: {}", token)?;
            writeln!(
                out,
                "Expires in: {}s",
                client.token_record().seconds_until_expiry()
            )?;
        }
        Action::RunQuery => {
            let Some(query) = query.filter(|q| !q.is_empty()) else {
                bail!("the --query option is required to run a query");
            };
            // One token lookup per action; the query reuses it even if it has lapsed since
            let (token, source) = client.acquire_token().await?;
            if source == TokenSource::Fetched {
                writeln!(out, "Token obtained successfully!")?;
            }
            writeln!(out, "Sending query to {}...", client.query_url())?;
            writeln!(out, "Request payload: {}", query)?;

            let result = client.send_query(&token, query).await?;
            writeln!(out, "API response:")?;
            writeln!(out, "{}", to_pretty_json(&result)?)?;
        }
    }
    Ok(())
}

/// Print the extra diagnostics some failures carry.
///
/// The error line itself goes to stderr from `main`.
pub fn report_failure<W: Write>(err: &anyhow::Error, out: &mut W) -> std::io::Result<()> {
    if let Some(ApiError::BadQuery(body)) = err.downcast_ref::<ApiError>() {
        writeln!(out, "{}", BAD_REQUEST_HINT)?;
        writeln!(out, "API response: {}", body)?;
    }
    Ok(())
}

/// Pretty-print JSON with 4-space indentation
pub fn to_pretty_json(value: &Value) -> Result<String> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(Vec::new(), formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(serializer.into_inner())?)
}
