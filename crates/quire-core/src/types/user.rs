//! User profile and authentication payloads.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{AccessToken, RefreshToken};

fn default_tier() -> String {
    "free".to_string()
}

/// Accept RFC 3339, or a naive ISO timestamp taken as UTC. Anything else
/// reads as `None` so one odd field never discards the whole profile.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }

    Ok(NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc()))
}

/// Snapshot of the signed-in user as reported by the backend.
///
/// Replaced wholesale on login, registration and refresh; never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default = "default_tier")]
    pub subscription_tier: String,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// A fresh token pair plus the profile it belongs to.
#[derive(Debug, Clone)]
pub struct AuthData {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub user: UserProfile,
}
