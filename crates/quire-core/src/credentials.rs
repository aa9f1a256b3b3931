//! Login and registration credentials.

use std::fmt;

use crate::Result;
use crate::error::InvalidInputError;

/// Email and password for logging in.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use quire_core::Credentials;
///
/// let creds = Credentials::new("ada@example.com", "hunter2");
/// assert_eq!(creds.email(), "ada@example.com");
/// ```
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns the email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing authentication requests.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Check the fields before anything is sent to the backend.
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)?;
        require("password", &self.password)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Details for creating a new account.
#[derive(Clone)]
pub struct Registration {
    name: String,
    email: String,
    password: String,
}

impl Registration {
    /// Create a new registration request.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Check the fields before anything is sent to the backend.
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        validate_email(&self.email)?;
        require("password", &self.password)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Loose email check; the backend does the real validation.
pub fn validate_email(email: &str) -> Result<()> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(InvalidInputError::Empty { field: "email" }.into());
    }
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(InvalidInputError::Email {
            value: email.to_string(),
            reason: "expected local@domain".to_string(),
        }
        .into()),
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(InvalidInputError::Empty { field }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn credentials_hides_password_in_debug() {
        let creds = Credentials::new("ada@example.com", "secret123");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("ada@example.com"));
        assert!(!debug.contains("secret123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn registration_hides_password_in_debug() {
        let reg = Registration::new("Ada", "ada@example.com", "secret123");
        let debug = format!("{:?}", reg);
        assert!(debug.contains("Ada"));
        assert!(!debug.contains("secret123"));
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["", "   ", "no-at-sign", "@example.com", "ada@"] {
            let result = Credentials::new(email, "pw").validate();
            assert!(
                matches!(result, Err(Error::InvalidInput(_))),
                "{email:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_empty_password_and_name() {
        let err = Credentials::new("a@b.com", "").validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid input: password must not be empty");

        let err = Registration::new("", "a@b.com", "pw").validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid input: name must not be empty");
    }

    #[test]
    fn accepts_plain_address() {
        assert!(Credentials::new("a@b.com", "wrong").validate().is_ok());
        assert!(Registration::new("A", "a@b.com", "pw").validate().is_ok());
    }
}
