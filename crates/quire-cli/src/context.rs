//! Builds a client from the global arguments.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use quire_core::ApiUrl;
use quire_file::FileTokenStore;
use quire_http::{Client, ClientConfig};

use crate::cli::GlobalArgs;

/// Get the session file path.
fn session_path(global: &GlobalArgs) -> Result<PathBuf> {
    if let Some(path) = &global.session_file {
        return Ok(path.clone());
    }

    let dirs =
        ProjectDirs::from("", "", "quire").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// Create a client whose session persists to the session file.
///
/// The session is not initialized; commands that need the persisted session
/// call [`Client::initialize`] themselves.
pub fn client(global: &GlobalArgs) -> Result<Client> {
    let api_url = ApiUrl::new(&global.api_url).context("Invalid API URL")?;
    let config = ClientConfig::new(api_url).with_timeout(Duration::from_secs(global.timeout));
    let store = FileTokenStore::new(session_path(global)?);

    Client::new(config, Arc::new(store)).context("Failed to build HTTP client")
}
