//! Whoami command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use quire_http::SessionState;

use crate::cli::GlobalArgs;
use crate::{context, output};

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(global: &GlobalArgs, _args: WhoamiArgs) -> Result<()> {
    let client = context::client(global)?;

    let state = client
        .initialize()
        .await
        .context("Failed to restore session")?;

    if state != SessionState::Authenticated {
        bail!("No active session. Run 'quire auth login' first.");
    }

    let user = client
        .session()
        .user()
        .await
        .context("Session has no user profile")?;

    output::profile(&user);
    output::field("API", client.api_url().as_str());

    Ok(())
}
