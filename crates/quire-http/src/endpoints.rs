//! API route definitions and request/response types.

use serde::{Deserialize, Serialize};

use quire_core::{AccessToken, AuthData, RefreshToken, UserProfile};

// ============================================================================
// Routes (relative to the `/api` mount)
// ============================================================================

/// POST, exchanges email/password for a token pair.
pub const LOGIN: &str = "/auth/login";

/// POST, creates an account and returns a token pair.
pub const REGISTER: &str = "/auth/register";

/// POST, exchanges a refresh token for a new token pair.
pub const REFRESH: &str = "/auth/refresh";

/// GET, returns the profile of the bearer.
pub const ME: &str = "/auth/me";

/// POST, asks the backend to send reset instructions.
pub const PASSWORD_RESET_REQUEST: &str = "/auth/password-reset/request";

/// POST, sets a new password using a reset token.
pub const PASSWORD_RESET_CONFIRM: &str = "/auth/password-reset/confirm";

/// Routes that never carry a bearer token and are never refreshed or replayed.
const AUTH_ROUTES: [&str; 5] = [
    LOGIN,
    REGISTER,
    REFRESH,
    PASSWORD_RESET_REQUEST,
    PASSWORD_RESET_CONFIRM,
];

/// Returns true if `path` names one of the credential-exchange routes.
pub fn is_auth_route(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_end_matches('/');
    let path = path.strip_prefix("/api").unwrap_or(path);
    let normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    AUTH_ROUTES.contains(&normalized.as_str())
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for login.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Request body for register.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Request body for refresh.
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response from login, register and refresh.
///
/// Every field is optional on the wire so that a partial payload can be
/// told apart from a transport failure.
#[derive(Debug, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl AuthResponse {
    /// Returns the auth data if both tokens and the user are present.
    pub fn into_auth_data(self) -> Option<AuthData> {
        let access_token = self.access_token.filter(|t| !t.is_empty())?;
        let refresh_token = self.refresh_token.filter(|t| !t.is_empty())?;
        Some(AuthData {
            access_token: AccessToken::new(access_token),
            refresh_token: RefreshToken::new(refresh_token),
            user: self.user?,
        })
    }
}

/// Request body for password reset request.
#[derive(Debug, Serialize)]
pub struct PasswordResetRequest<'a> {
    pub email: &'a str,
}

/// Request body for password reset confirmation.
#[derive(Serialize)]
pub struct PasswordResetConfirm<'a> {
    pub token: &'a str,
    pub new_password: &'a str,
}

/// Plain acknowledgement body.
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body produced by the backend.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Flattens `detail` into a single human-readable line.
    ///
    /// `detail` is either a string or, for validation failures, a list of
    /// objects each carrying a `msg`.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recognizes_auth_routes() {
        assert!(is_auth_route("/auth/login"));
        assert!(is_auth_route("auth/register"));
        assert!(is_auth_route("/api/auth/refresh"));
        assert!(is_auth_route("/auth/refresh/"));
        assert!(is_auth_route("/auth/password-reset/confirm"));
        assert!(is_auth_route("/auth/login?next=books"));
    }

    #[test]
    fn protected_routes_are_not_auth_routes() {
        assert!(!is_auth_route("/auth/me"));
        assert!(!is_auth_route("/books"));
        assert!(!is_auth_route("/auth/login/extra"));
    }

    #[test]
    fn auth_response_requires_user() {
        let response: AuthResponse = serde_json::from_value(json!({
            "access_token": "a",
            "refresh_token": "r",
            "token_type": "bearer"
        }))
        .unwrap();
        assert!(response.into_auth_data().is_none());
    }

    #[test]
    fn auth_response_requires_non_empty_tokens() {
        let response: AuthResponse = serde_json::from_value(json!({
            "access_token": "",
            "refresh_token": "r",
            "user": {"id": "u-1", "name": "Ada", "email": "ada@example.com"}
        }))
        .unwrap();
        assert!(response.into_auth_data().is_none());
    }

    #[test]
    fn auth_response_complete() {
        let response: AuthResponse = serde_json::from_value(json!({
            "access_token": "a",
            "refresh_token": "r",
            "user": {"id": "u-1", "name": "Ada", "email": "ada@example.com"}
        }))
        .unwrap();
        let data = response.into_auth_data().unwrap();
        assert_eq!(data.access_token.as_str(), "a");
        assert_eq!(data.user.id, "u-1");
    }

    #[test]
    fn error_detail_string() {
        let body: ErrorResponse =
            serde_json::from_value(json!({"detail": "Invalid credentials"})).unwrap();
        assert_eq!(body.message().as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn error_detail_validation_list() {
        let body: ErrorResponse = serde_json::from_value(json!({
            "detail": [
                {"loc": ["body", "email"], "msg": "value is not a valid email address"},
                {"loc": ["body", "password"], "msg": "field required"}
            ]
        }))
        .unwrap();
        assert_eq!(
            body.message().as_deref(),
            Some("value is not a valid email address; field required")
        );
    }

    #[test]
    fn error_detail_missing() {
        let body: ErrorResponse = serde_json::from_value(json!({})).unwrap();
        assert!(body.message().is_none());
    }
}
