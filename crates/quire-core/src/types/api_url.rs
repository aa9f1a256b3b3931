//! Backend base address.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// Every backend route lives under this prefix.
const API_PREFIX: &str = "/api";

/// Where the authoring backend is served from.
///
/// Plain `http` is only accepted for loopback hosts; anything reachable over
/// a network needs `https` because bearer tokens travel in headers.
///
/// ```
/// use quire_core::ApiUrl;
///
/// let api = ApiUrl::new("https://books.example.com").unwrap();
/// assert_eq!(api.endpoint("/auth/login"),
///            "https://books.example.com/api/auth/login");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiUrl(Url);

impl ApiUrl {
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let raw = s.as_ref();
        let checked = Url::parse(raw)
            .map_err(|e| e.to_string())
            .and_then(|url| Self::check(&url).map(|()| url).map_err(str::to_string));

        checked.map(Self).map_err(|reason| {
            InvalidInputError::ApiUrl {
                value: raw.to_string(),
                reason,
            }
            .into()
        })
    }

    /// Absolute URL of a backend route, e.g. `/auth/me`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{}/{}",
            self.0.as_str().trim_end_matches('/'),
            API_PREFIX,
            path.trim_start_matches('/')
        )
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn check(url: &Url) -> Result<(), &'static str> {
        let host = match url.host_str() {
            Some(host) if !url.cannot_be_a_base() => host,
            _ => return Err("expected an absolute address with a host"),
        };

        match url.scheme() {
            "https" => {}
            "http" if matches!(host, "localhost" | "127.0.0.1" | "[::1]" | "::1") => {}
            "http" => return Err("plain http is only allowed for loopback hosts"),
            _ => return Err("scheme must be https"),
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err("query strings and fragments are not allowed");
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ApiUrl {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ApiUrl> for String {
    fn from(api: ApiUrl) -> Self {
        api.0.into()
    }
}
