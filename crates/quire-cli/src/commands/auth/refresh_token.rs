//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::GlobalArgs;
use crate::{context, output};

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(global: &GlobalArgs, _args: RefreshTokenArgs) -> Result<()> {
    let client = context::client(global)?;

    // Load the stored pair without validating the access token first.
    client
        .session()
        .load_tokens()
        .await
        .context("Failed to load session")?;

    eprintln!("{}", "Refreshing session...".dimmed());

    let auth = client
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    output::field("ID", &auth.user.id);
    output::field("Email", &auth.user.email);

    Ok(())
}
