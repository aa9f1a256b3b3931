//! Core API types.
//!
//! These types enforce their invariants at construction time.

mod api_url;
mod user;

pub use api_url::ApiUrl;
pub use user::{AuthData, UserProfile};
