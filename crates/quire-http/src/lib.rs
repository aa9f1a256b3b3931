//! quire-http - HTTP client for the authoring API.
//!
//! All authenticated traffic flows through a [`Client`], which owns the
//! [`SessionStore`] and transparently refreshes expired access tokens.

mod client;
mod config;
pub mod endpoints;
mod refresh;
mod request;
mod session;
mod transport;

pub use client::Client;
pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use request::OutgoingRequest;
pub use reqwest::Method;
pub use session::{SessionState, SessionStore};
