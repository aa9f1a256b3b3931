//! Core traits for session persistence.

mod token_store;

pub use token_store::{PersistedTokens, TokenStore};
