//! De-duplicated token refresh.
//!
//! At most one refresh call is in flight per client. Tasks that ask for a
//! refresh while one is running await the same shared outcome instead of
//! issuing their own call.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use quire_core::error::AuthError;
use quire_core::{AuthData, Error, RefreshToken, Result};

use crate::endpoints::{self, AuthResponse, RefreshRequest};
use crate::request::OutgoingRequest;
use crate::session::SessionStore;
use crate::transport::ApiClient;

type SharedOutcome = Shared<BoxFuture<'static, Result<AuthData>>>;

struct PendingRefresh {
    id: u64,
    outcome: SharedOutcome,
}

type Slot = Arc<Mutex<Option<PendingRefresh>>>;

/// Exchanges the refresh token for a new pair, once per concurrency window.
#[derive(Clone)]
pub(crate) struct RefreshCoordinator {
    api: ApiClient,
    session: SessionStore,
    in_flight: Slot,
    next_id: Arc<AtomicU64>,
}

impl RefreshCoordinator {
    pub(crate) fn new(api: ApiClient, session: SessionStore) -> Self {
        Self {
            api,
            session,
            in_flight: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Refresh the session, joining an in-flight refresh if there is one.
    ///
    /// Uses `explicit` when given, otherwise the stored refresh token.
    pub(crate) async fn refresh(&self, explicit: Option<RefreshToken>) -> Result<AuthData> {
        let outcome = {
            let mut slot = self.in_flight.lock().await;
            match slot.as_ref() {
                Some(pending) => {
                    debug!(refresh = pending.id, "Joining in-flight refresh");
                    pending.outcome.clone()
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                    let outcome = Self::run(
                        self.api.clone(),
                        self.session.clone(),
                        Arc::clone(&self.in_flight),
                        id,
                        explicit,
                    )
                    .boxed()
                    .shared();
                    *slot = Some(PendingRefresh {
                        id,
                        outcome: outcome.clone(),
                    });
                    outcome
                }
            }
        };

        outcome.await
    }

    /// Returns true while a refresh is running.
    #[cfg(test)]
    pub(crate) async fn is_in_flight(&self) -> bool {
        self.in_flight.lock().await.is_some()
    }

    #[instrument(skip(api, session, slot, explicit), fields(refresh = id))]
    async fn run(
        api: ApiClient,
        session: SessionStore,
        slot: Slot,
        id: u64,
        explicit: Option<RefreshToken>,
    ) -> Result<AuthData> {
        let token = match explicit {
            Some(token) => Some(token),
            None => session.refresh_token().await,
        };

        let result = match token {
            Some(token) => {
                info!("Refreshing session");
                Self::exchange(&api, &token).await
            }
            None => Err(AuthError::NoRefreshToken.into()),
        };

        match &result {
            Ok(auth) => {
                if let Err(err) = session.apply_auth_data(auth).await {
                    warn!(error = %err, "Refreshed tokens could not be persisted");
                }
                debug!("Session refreshed successfully");
            }
            Err(err) if err.forces_logout() => {
                warn!(error = %err, "Refresh failed; logging out");
                session.clear().await;
            }
            Err(err) => {
                warn!(error = %err, "Refresh failed; keeping session");
            }
        }

        // Reset before waiters resume so the next 401 can start a new refresh.
        let mut pending = slot.lock().await;
        if pending.as_ref().is_some_and(|p| p.id == id) {
            *pending = None;
        }

        result
    }

    async fn exchange(api: &ApiClient, token: &RefreshToken) -> Result<AuthData> {
        let request = OutgoingRequest::post(endpoints::REFRESH).with_json(&RefreshRequest {
            refresh_token: token.as_str(),
        })?;

        let body = match api.send(&request, None).await {
            Ok(body) => body,
            Err(Error::Protocol(err)) => {
                return Err(AuthError::RefreshRejected {
                    message: err.message(),
                }
                .into());
            }
            Err(err) => return Err(err),
        };

        let response: AuthResponse =
            serde_json::from_slice(&body).map_err(|e| AuthError::RefreshRejected {
                message: format!("malformed refresh response: {}", e),
            })?;

        response.into_auth_data().ok_or_else(|| {
            AuthError::RefreshRejected {
                message: "refresh response is missing tokens or user".to_string(),
            }
            .into()
        })
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}
