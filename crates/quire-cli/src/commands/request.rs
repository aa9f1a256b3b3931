//! Ad-hoc authenticated request command.

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use quire_http::{Method, OutgoingRequest, SessionState};

use crate::cli::GlobalArgs;
use crate::{context, output};

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, DELETE, ...)
    pub method: String,

    /// Path under the API prefix, e.g. /books
    pub path: String,

    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Query parameters as key=value
    #[arg(short, long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<String>,
}

pub async fn run(global: &GlobalArgs, args: RequestArgs) -> Result<()> {
    let client = context::client(global)?;

    let state = client
        .initialize()
        .await
        .context("Failed to restore session")?;
    if state != SessionState::Authenticated {
        debug!("Sending request without a session");
    }

    let method: Method = args
        .method
        .to_uppercase()
        .parse()
        .with_context(|| format!("Invalid HTTP method: {}", args.method))?;

    let mut request = OutgoingRequest::new(method, args.path);

    for pair in &args.query {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("Query parameter must be KEY=VALUE: {pair}"))?;
        request = request.with_query(key, value);
    }

    if let Some(data) = &args.data {
        let body: serde_json::Value =
            serde_json::from_str(data).context("Request body is not valid JSON")?;
        request = request.with_body(body);
    }

    let response: serde_json::Value = client.send(request).await.context("Request failed")?;
    output::json_pretty(&response)
}
