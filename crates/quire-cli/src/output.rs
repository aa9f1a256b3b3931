//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use quire_core::UserProfile;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print the fields of a user profile.
pub fn profile(user: &UserProfile) {
    field("ID", &user.id);
    field("Name", &user.name);
    field("Email", &user.email);
    field("Tier", &user.subscription_tier);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
