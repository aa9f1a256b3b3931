//! Auth subcommand implementations.

mod login;
mod logout;
mod refresh_token;
mod register;
mod reset_password;
mod whoami;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::GlobalArgs;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Create a new session (login)
    Login(login::LoginArgs),

    /// Create an account and log into it
    Register(register::RegisterArgs),

    /// Forget the stored session
    Logout(logout::LogoutArgs),

    /// Display the signed-in user
    Whoami(whoami::WhoamiArgs),

    /// Refresh the session tokens
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Request or confirm a password reset
    ResetPassword(reset_password::ResetPasswordArgs),
}

pub async fn handle(global: &GlobalArgs, cmd: AuthCommand) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Login(args) => login::run(global, args).await,
        AuthSubcommand::Register(args) => register::run(global, args).await,
        AuthSubcommand::Logout(args) => logout::run(global, args).await,
        AuthSubcommand::Whoami(args) => whoami::run(global, args).await,
        AuthSubcommand::RefreshToken(args) => refresh_token::run(global, args).await,
        AuthSubcommand::ResetPassword(args) => reset_password::run(global, args).await,
    }
}
