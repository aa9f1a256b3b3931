//! In-memory token store.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::Result;
use crate::traits::{PersistedTokens, TokenStore};

/// A [`TokenStore`] that keeps tokens in process memory.
///
/// Clones share the same slot, so a test can hold one handle while the
/// session owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    slot: Arc<RwLock<PersistedTokens>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with tokens.
    pub fn with_tokens(tokens: PersistedTokens) -> Self {
        Self {
            slot: Arc::new(RwLock::new(tokens)),
        }
    }

    /// Returns a copy of what is currently stored.
    pub fn snapshot(&self) -> PersistedTokens {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<PersistedTokens> {
        Ok(self.snapshot())
    }

    async fn save(&self, tokens: &PersistedTokens) -> Result<()> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = tokens.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = PersistedTokens::default();
        Ok(())
    }
}
