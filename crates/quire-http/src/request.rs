//! Outgoing request description.

use reqwest::Method;
use serde::Serialize;

use quire_core::Result;
use quire_core::error::InvalidInputError;

use crate::endpoints;

/// A request on its way to the API.
///
/// Paths are relative to the `/api` mount, e.g. `/books` or
/// `/chapters/{id}`. The bearer token is not part of the request; the
/// client attaches the session's current token each time it is sent.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    retried: bool,
}

impl OutgoingRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be represented as JSON.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Other {
            message: format!("request body is not valid JSON: {}", e),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Attach an already-built JSON body.
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    /// Auth routes are sent without a bearer token and are never replayed.
    pub fn is_auth_route(&self) -> bool {
        endpoints::is_auth_route(&self.path)
    }

    /// Returns true once the request has been replayed after a refresh.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn starts_unretried() {
        let mut request = OutgoingRequest::get("/books");
        assert!(!request.is_retried());
        request.mark_retried();
        assert!(request.is_retried());
    }

    #[test]
    fn flags_auth_routes() {
        assert!(OutgoingRequest::post(endpoints::LOGIN).is_auth_route());
        assert!(OutgoingRequest::post(endpoints::REFRESH).is_auth_route());
        assert!(!OutgoingRequest::get(endpoints::ME).is_auth_route());
        assert!(!OutgoingRequest::get("/books").is_auth_route());
    }

    #[test]
    fn builds_body_and_query() {
        let request = OutgoingRequest::put("/chapters/c-1")
            .with_json(&json!({"title": "Prologue"}))
            .unwrap()
            .with_query("autosave", "true");
        assert_eq!(request.method(), &Method::PUT);
        assert_eq!(request.body(), Some(&json!({"title": "Prologue"})));
        assert_eq!(
            request.query(),
            &[("autosave".to_string(), "true".to_string())]
        );
    }
}
