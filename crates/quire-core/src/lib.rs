//! quire-core - Core types and traits for the quire API client.

pub mod credentials;
pub mod error;
pub mod memory;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::{Credentials, Registration};
pub use error::Error;
pub use memory::MemoryTokenStore;
pub use tokens::{AccessToken, RefreshToken};
pub use traits::{PersistedTokens, TokenStore};
pub use types::{ApiUrl, AuthData, UserProfile};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
