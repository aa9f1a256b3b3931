//! Authenticated API client.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use quire_core::credentials::validate_email;
use quire_core::error::{AuthError, InvalidInputError, ProtocolError};
use quire_core::{
    AccessToken, ApiUrl, AuthData, Credentials, Error, RefreshToken, Registration, Result,
    TokenStore, UserProfile,
};

use crate::config::ClientConfig;
use crate::endpoints::{
    self, AuthResponse, LoginRequest, MessageResponse, PasswordResetConfirm,
    PasswordResetRequest, RegisterRequest,
};
use crate::refresh::RefreshCoordinator;
use crate::request::OutgoingRequest;
use crate::session::{SessionState, SessionStore};
use crate::transport::{ApiClient, decode};

/// Client for the authoring API.
///
/// Owns the session and attaches its access token to every request. When a
/// protected request comes back with 401 the client refreshes the token pair
/// (sharing one refresh between all concurrent callers) and replays the
/// request once.
///
/// Cheap to clone; clones share the session.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use quire_core::{ApiUrl, Credentials, MemoryTokenStore};
/// use quire_http::{Client, ClientConfig};
///
/// # async fn example() -> Result<(), quire_core::Error> {
/// let config = ClientConfig::new(ApiUrl::new("https://books.example.com")?);
/// let client = Client::new(config, Arc::new(MemoryTokenStore::new()))?;
///
/// let user = client.login(&Credentials::new("ada@example.com", "secret")).await?;
/// println!("Logged in as {}", user.name);
///
/// let books: serde_json::Value = client.get("/books").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    api: ApiClient,
    session: SessionStore,
    refresher: RefreshCoordinator,
}

impl Client {
    /// Create a client whose session persists to `storage`.
    ///
    /// The session starts [`Uninitialized`](SessionState::Uninitialized);
    /// call [`initialize`](Self::initialize) to restore persisted tokens.
    pub fn new(config: ClientConfig, storage: Arc<dyn TokenStore>) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        let session = SessionStore::new(storage);
        let refresher = RefreshCoordinator::new(api.clone(), session.clone());
        Ok(Self {
            api,
            session,
            refresher,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn api_url(&self) -> &ApiUrl {
        self.api.api_url()
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Restore the session from persisted tokens.
    ///
    /// Validates the access token against the backend and falls back to a
    /// refresh when it has expired. Ends `Authenticated` or `Anonymous`.
    ///
    /// # Errors
    ///
    /// Network and storage failures are returned; the session is left
    /// `Anonymous` with its tokens intact so a later call can retry.
    #[instrument(skip(self), fields(api = %self.api.api_url()))]
    pub async fn initialize(&self) -> Result<SessionState> {
        self.session.set_state(SessionState::Loading).await;
        let tokens = match self.session.load_tokens().await {
            Ok(tokens) => tokens,
            Err(err) => {
                self.session.set_state(SessionState::Anonymous).await;
                return Err(err);
            }
        };
        let has_refresh = tokens.refresh_token.is_some();

        let state = match tokens.access_token {
            None if !has_refresh => {
                self.session.set_state(SessionState::Anonymous).await;
                SessionState::Anonymous
            }
            None => self.recover_via_refresh().await?,
            Some(token) => match self.fetch_profile(&token).await {
                Ok(user) => {
                    self.session.set_user(user).await;
                    SessionState::Authenticated
                }
                Err(err) if err.is_unauthorized() && has_refresh => {
                    debug!("Persisted access token rejected");
                    self.recover_via_refresh().await?
                }
                Err(err) if err.is_unauthorized() => {
                    self.session.clear().await;
                    SessionState::Anonymous
                }
                Err(err) => {
                    self.session.set_state(SessionState::Anonymous).await;
                    return Err(err);
                }
            },
        };

        info!(?state, "Session initialized");
        Ok(state)
    }

    async fn recover_via_refresh(&self) -> Result<SessionState> {
        match self.refresher.refresh(None).await {
            Ok(_) => Ok(SessionState::Authenticated),
            // The coordinator has already cleared the session.
            Err(err) if err.forces_logout() => Ok(SessionState::Anonymous),
            Err(err) => {
                self.session.set_state(SessionState::Anonymous).await;
                Err(err)
            }
        }
    }

    async fn fetch_profile(&self, token: &AccessToken) -> Result<UserProfile> {
        let body = self
            .api
            .send(&OutgoingRequest::get(endpoints::ME), Some(token))
            .await?;
        decode(&body)
    }

    // ========================================================================
    // Auth operations
    // ========================================================================

    /// Log in with email and password.
    ///
    /// On success the session holds the new token pair and the profile is
    /// returned.
    ///
    /// # Errors
    ///
    /// A refusal from the backend is [`AuthError::AuthenticationFailed`]
    /// carrying its message; the existing session is left untouched.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile> {
        credentials.validate()?;
        info!("Logging in");

        let request = OutgoingRequest::post(endpoints::LOGIN).with_json(&LoginRequest {
            email: credentials.email(),
            password: credentials.password(),
        })?;

        let body = self.api.send(&request, None).await.map_err(|err| {
            classify_refusal(err, |message| AuthError::AuthenticationFailed { message })
        })?;

        self.accept_auth_response(&body).await
    }

    /// Create an account and log into it.
    ///
    /// # Errors
    ///
    /// A refusal from the backend (e.g. the email is taken) is
    /// [`AuthError::RegistrationFailed`], distinct from network errors.
    #[instrument(skip(self, registration), fields(email = %registration.email()))]
    pub async fn register(&self, registration: &Registration) -> Result<UserProfile> {
        registration.validate()?;
        info!("Registering account");

        let request = OutgoingRequest::post(endpoints::REGISTER).with_json(&RegisterRequest {
            name: registration.name(),
            email: registration.email(),
            password: registration.password(),
        })?;

        let body = self.api.send(&request, None).await.map_err(|err| {
            classify_refusal(err, |message| AuthError::RegistrationFailed { message })
        })?;

        self.accept_auth_response(&body).await
    }

    async fn accept_auth_response(&self, body: &[u8]) -> Result<UserProfile> {
        let response: AuthResponse = decode(body)?;
        let auth = response.into_auth_data().ok_or_else(|| {
            Error::Protocol(ProtocolError::new(
                200,
                Some("auth response is missing tokens or user".to_string()),
            ))
        })?;

        self.session.apply_auth_data(&auth).await?;
        debug!(user = %auth.user.id, "Authenticated");
        Ok(auth.user)
    }

    /// Log out locally. Never fails and never calls the backend.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        info!("Logging out");
        self.session.clear().await;
    }

    /// Refresh the token pair using the stored refresh token.
    pub async fn refresh(&self) -> Result<AuthData> {
        self.refresher.refresh(None).await
    }

    /// Refresh the token pair using an explicit refresh token.
    pub async fn refresh_with(&self, token: RefreshToken) -> Result<AuthData> {
        self.refresher.refresh(Some(token)).await
    }

    /// Fetch the profile of the signed-in user and store it.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<UserProfile> {
        let user: UserProfile = self.send(OutgoingRequest::get(endpoints::ME)).await?;
        self.session.set_user(user.clone()).await;
        Ok(user)
    }

    /// Ask the backend to send password reset instructions.
    ///
    /// The backend answers the same way whether or not the address exists.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<String> {
        validate_email(email)?;
        let request = OutgoingRequest::post(endpoints::PASSWORD_RESET_REQUEST)
            .with_json(&PasswordResetRequest { email })?;
        let response: MessageResponse = self.send(request).await?;
        Ok(response.message)
    }

    /// Set a new password using a token from the reset email.
    #[instrument(skip(self, token, new_password))]
    pub async fn confirm_password_reset(&self, token: &str, new_password: &str) -> Result<String> {
        if token.is_empty() {
            return Err(InvalidInputError::Empty { field: "token" }.into());
        }
        if new_password.is_empty() {
            return Err(InvalidInputError::Empty {
                field: "new password",
            }
            .into());
        }
        let request = OutgoingRequest::post(endpoints::PASSWORD_RESET_CONFIRM)
            .with_json(&PasswordResetConfirm {
                token,
                new_password,
            })?;
        let response: MessageResponse = self.send(request).await?;
        Ok(response.message)
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Send a request with the session's token, refreshing and replaying once
    /// on 401.
    ///
    /// Auth routes are sent without a token and their 401s are returned
    /// as-is. If the refresh fails, its error replaces the original 401.
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn execute(&self, mut request: OutgoingRequest) -> Result<Vec<u8>> {
        let auth_route = request.is_auth_route();

        loop {
            let sent_with = if auth_route {
                None
            } else {
                self.session.access_token().await
            };

            match self.api.send(&request, sent_with.as_ref()).await {
                Ok(body) => return Ok(body),
                Err(err) if !err.is_unauthorized() || auth_route || request.is_retried() => {
                    return Err(err);
                }
                Err(_) => {
                    request.mark_retried();
                    self.renew_token(sent_with.as_ref()).await?;
                }
            }
        }
    }

    /// Make sure the session holds a token newer than `rejected`.
    async fn renew_token(&self, rejected: Option<&AccessToken>) -> Result<()> {
        let current = self.session.access_token().await;
        if current.is_some() && current.as_ref() != rejected {
            debug!("Token rotated while the request was in flight; replaying");
            return Ok(());
        }

        // A refresh that already failed has cleared the session under us.
        if current.is_none() && rejected.is_some() {
            debug!("Session ended while the request was in flight");
            return Err(AuthError::RefreshRejected {
                message: "session ended while the request was in flight".to_string(),
            }
            .into());
        }

        debug!("Access token rejected; refreshing");
        self.refresher.refresh(None).await.map(|_| ())
    }

    /// Send a request and decode the JSON response.
    pub async fn send<R: DeserializeOwned>(&self, request: OutgoingRequest) -> Result<R> {
        let body = self.execute(request).await?;
        decode(&body)
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.send(OutgoingRequest::get(path)).await
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(OutgoingRequest::post(path).with_json(body)?).await
    }

    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(OutgoingRequest::put(path).with_json(body)?).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.send(OutgoingRequest::delete(path)).await
    }
}

/// Turn a 4xx refusal from a credential route into the given auth error.
///
/// Server errors and transport failures pass through unchanged.
fn classify_refusal(err: Error, refused: impl FnOnce(String) -> AuthError) -> Error {
    match err {
        Error::Protocol(protocol) if (400..500).contains(&protocol.status) => {
            refused(protocol.message()).into()
        }
        other => other,
    }
}
