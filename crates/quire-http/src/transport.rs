//! HTTP transport for API requests.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use quire_core::error::{ProtocolError, TransportError};
use quire_core::{AccessToken, ApiUrl, Error, Result};

use crate::config::ClientConfig;
use crate::endpoints::ErrorResponse;
use crate::request::OutgoingRequest;

/// HTTP client bound to one backend.
///
/// Stateless with respect to authentication: the bearer token, if any, is
/// passed in for each call.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api: ApiUrl,
    timeout: Duration,
}

impl ApiClient {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::Http {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api: config.api_url.clone(),
            timeout: config.timeout,
        })
    }

    /// Returns the API URL this client is configured for.
    pub fn api_url(&self) -> &ApiUrl {
        &self.api
    }

    /// Send a request and return the raw success body.
    ///
    /// Non-success statuses become [`Error::Protocol`] carrying the
    /// backend's `detail`.
    #[instrument(skip(self, request, token), fields(api = %self.api, method = %request.method(), path = request.path()))]
    pub async fn send(
        &self,
        request: &OutgoingRequest,
        token: Option<&AccessToken>,
    ) -> Result<Vec<u8>> {
        let url = self.api.endpoint(request.path());
        debug!(authed = token.is_some(), "API request");

        let mut builder = self.client.request(request.method().clone(), &url);
        if !request.query().is_empty() {
            builder = builder.query(request.query());
        }
        if let Some(body) = request.body() {
            trace!(?body, "request body");
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token.as_str());
        }

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        trace!(status = %status, "API response");

        if status.is_success() {
            let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
            Ok(body.to_vec())
        } else {
            Err(Error::Protocol(Self::parse_error_response(response).await))
        }
    }

    /// Parse an error response.
    async fn parse_error_response(response: reqwest::Response) -> ProtocolError {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(body) => ProtocolError::new(status, body.message()),
            Err(_) => ProtocolError::new(status, None),
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        let err = if err.is_timeout() {
            TransportError::Timeout {
                duration_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        };
        Error::Transport(err)
    }
}

/// Decode a success body. An empty body decodes as JSON `null`.
pub fn decode<R: DeserializeOwned>(body: &[u8]) -> Result<R> {
    let body = if body.is_empty() { b"null".as_slice() } else { body };
    serde_json::from_slice(body).map_err(|e| {
        Error::Protocol(ProtocolError::new(
            200,
            Some(format!("malformed response body: {}", e)),
        ))
    })
}
