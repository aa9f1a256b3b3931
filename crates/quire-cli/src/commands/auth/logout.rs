//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use crate::cli::GlobalArgs;
use crate::{context, output};

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(global: &GlobalArgs, _args: LogoutArgs) -> Result<()> {
    let client = context::client(global)?;
    client.logout().await;

    output::success("Logged out");
    Ok(())
}
