//! Error types for the quire client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, API, input validation and storage errors.
//!
//! Every variant is `Clone` so the outcome of a shared token refresh can be
//! handed to each task waiting on it.

use std::fmt;
use thiserror::Error;

/// The unified error type for quire operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, offline).
    #[error("network error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (bad credentials, expired session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-success responses from the API.
    #[error("API error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Durable token storage errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns true if the backend answered with HTTP 401.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Protocol(err) if err.is_unauthorized())
    }

    /// Returns true for transport-level failures.
    ///
    /// These are left to the caller to retry; the client never retries them.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Returns true if this error ends the current session.
    pub fn forces_logout(&self) -> bool {
        matches!(
            self,
            Error::Auth(AuthError::NoRefreshToken | AuthError::RefreshRejected { .. })
        )
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// No refresh token was supplied and none is stored.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// The backend refused the refresh token, or answered with a malformed payload.
    #[error("session expired: {message}")]
    RefreshRejected { message: String },

    /// Login was refused (invalid credentials, validation error).
    #[error("login failed: {message}")]
    AuthenticationFailed { message: String },

    /// Registration was refused (duplicate email, validation error).
    #[error("registration failed: {message}")]
    RegistrationFailed { message: String },
}

/// A non-success response from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// The `detail` message from the response body, if present.
    pub detail: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, detail: Option<String>) -> Self {
        Self { status, detail }
    }

    /// Check if this is an authorization failure.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Returns the backend message, falling back to the status line.
    pub fn message(&self) -> String {
        self.detail
            .clone()
            .unwrap_or_else(|| format!("HTTP {}", self.status))
    }
}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid email address.
    #[error("invalid email '{value}': {reason}")]
    Email { value: String, reason: String },

    /// A required field was empty.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Errors from the durable token store.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("I/O error on {location}: {message}")]
    Io { location: String, message: String },

    /// The stored data could not be parsed.
    #[error("corrupt session data in {location}: {message}")]
    Corrupt { location: String, message: String },
}
