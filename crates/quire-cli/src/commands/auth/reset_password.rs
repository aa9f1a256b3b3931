//! Password reset command implementation.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::cli::GlobalArgs;
use crate::{context, output};

#[derive(Args, Debug)]
pub struct ResetPasswordArgs {
    #[command(subcommand)]
    pub step: ResetStep,
}

#[derive(Subcommand, Debug)]
pub enum ResetStep {
    /// Ask the backend to email a reset link
    Request {
        /// Account email
        #[arg(long)]
        email: String,
    },

    /// Set a new password using the emailed token
    Confirm {
        /// Reset token from the email
        #[arg(long)]
        token: String,

        /// The new password
        #[arg(long, env = "QUIRE_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
}

pub async fn run(global: &GlobalArgs, args: ResetPasswordArgs) -> Result<()> {
    let client = context::client(global)?;

    let message = match args.step {
        ResetStep::Request { email } => {
            eprintln!("{}", "Requesting password reset...".dimmed());
            client
                .request_password_reset(&email)
                .await
                .context("Failed to request password reset")?
        }
        ResetStep::Confirm {
            token,
            new_password,
        } => client
            .confirm_password_reset(&token, &new_password)
            .await
            .context("Failed to reset password")?,
    };

    output::success(&message);
    Ok(())
}
