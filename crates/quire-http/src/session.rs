//! Session store: the single source of truth for authentication state.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use quire_core::{
    AccessToken, AuthData, PersistedTokens, RefreshToken, Result, TokenStore, UserProfile,
};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing has been loaded yet.
    Uninitialized,
    /// Persisted tokens are being checked against the backend.
    Loading,
    /// A user is signed in.
    Authenticated,
    /// No user is signed in.
    Anonymous,
}

/// Shared authentication state plus its durable backing store.
///
/// Cheap to clone; clones observe the same state. Once
/// [`apply_auth_data`](Self::apply_auth_data) returns, every request sent
/// afterwards uses the new access token.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    data: RwLock<SessionData>,
    storage: Arc<dyn TokenStore>,
}

struct SessionData {
    state: SessionState,
    access_token: Option<AccessToken>,
    refresh_token: Option<RefreshToken>,
    user: Option<UserProfile>,
}

impl SessionStore {
    /// Create an uninitialized session backed by `storage`.
    pub fn new(storage: Arc<dyn TokenStore>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                data: RwLock::new(SessionData {
                    state: SessionState::Uninitialized,
                    access_token: None,
                    refresh_token: None,
                    user: None,
                }),
                storage,
            }),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.inner.data.read().await.state
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state().await == SessionState::Authenticated
    }

    pub async fn user(&self) -> Option<UserProfile> {
        self.inner.data.read().await.user.clone()
    }

    /// The token attached to outgoing requests, if any.
    pub async fn access_token(&self) -> Option<AccessToken> {
        self.inner.data.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<RefreshToken> {
        self.inner.data.read().await.refresh_token.clone()
    }

    /// Pull persisted tokens into memory without contacting the backend.
    ///
    /// Any in-memory profile is dropped; the lifecycle state is untouched.
    pub async fn load_tokens(&self) -> Result<PersistedTokens> {
        let tokens = self.inner.storage.load().await?;

        let mut data = self.inner.data.write().await;
        data.access_token = tokens.access_token.clone();
        data.refresh_token = tokens.refresh_token.clone();
        data.user = None;
        debug!(
            has_access = tokens.access_token.is_some(),
            has_refresh = tokens.refresh_token.is_some(),
            "Loaded persisted tokens"
        );
        Ok(tokens)
    }

    pub(crate) async fn set_state(&self, state: SessionState) {
        self.inner.data.write().await.state = state;
    }

    /// Replace the profile of the current session.
    pub(crate) async fn set_user(&self, user: UserProfile) {
        let mut data = self.inner.data.write().await;
        data.user = Some(user);
        data.state = SessionState::Authenticated;
    }

    /// Install a fresh token pair and profile.
    ///
    /// Memory is updated first, under one lock, so that concurrent requests
    /// never see a mix of old and new values; the pair is then persisted.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persisting fails. The in-memory session is
    /// already updated at that point.
    pub async fn apply_auth_data(&self, auth: &AuthData) -> Result<()> {
        {
            let mut data = self.inner.data.write().await;
            data.access_token = Some(auth.access_token.clone());
            data.refresh_token = Some(auth.refresh_token.clone());
            data.user = Some(auth.user.clone());
            data.state = SessionState::Authenticated;
        }
        debug!(user = %auth.user.id, "Applied auth data");

        self.inner
            .storage
            .save(&PersistedTokens {
                access_token: Some(auth.access_token.clone()),
                refresh_token: Some(auth.refresh_token.clone()),
            })
            .await
    }

    /// Forget the session in memory and in storage.
    ///
    /// Safe to call when already logged out. Storage failures are logged,
    /// never returned.
    pub async fn clear(&self) {
        let was_signed_in = {
            let mut data = self.inner.data.write().await;
            let was_signed_in = data.access_token.is_some() || data.refresh_token.is_some();
            data.access_token = None;
            data.refresh_token = None;
            data.user = None;
            data.state = SessionState::Anonymous;
            was_signed_in
        };

        if let Err(err) = self.inner.storage.clear().await {
            warn!(error = %err, "Failed to clear persisted tokens");
        }

        if was_signed_in {
            info!("Session cleared");
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("storage", &self.inner.storage)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
