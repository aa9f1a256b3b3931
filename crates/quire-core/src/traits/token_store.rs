//! Durable token storage trait.

use async_trait::async_trait;

use crate::{AccessToken, RefreshToken, Result};

/// The tokens that survive a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedTokens {
    pub access_token: Option<AccessToken>,
    pub refresh_token: Option<RefreshToken>,
}

impl PersistedTokens {
    /// Returns true if neither token is present.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Durable storage for the session's token pair.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Load the stored tokens. A store with nothing in it yields empty tokens.
    async fn load(&self) -> Result<PersistedTokens>;

    /// Replace the stored tokens.
    async fn save(&self, tokens: &PersistedTokens) -> Result<()>;

    /// Remove any stored tokens. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<()>;
}
