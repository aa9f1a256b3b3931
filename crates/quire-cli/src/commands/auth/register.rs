//! Register command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use quire_core::Registration;

use crate::cli::GlobalArgs;
use crate::{context, output};

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "QUIRE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(global: &GlobalArgs, args: RegisterArgs) -> Result<()> {
    let client = context::client(global)?;
    let registration = Registration::new(&args.name, &args.email, &args.password);

    eprintln!("{}", "Creating account...".dimmed());

    let user = client
        .register(&registration)
        .await
        .context("Failed to register")?;

    output::success("Account created");
    println!();
    output::profile(&user);

    Ok(())
}
