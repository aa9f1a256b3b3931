//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::auth::AuthCommand;
use crate::commands::request::RequestArgs;

/// Command-line client for the quire authoring API.
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection and storage settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Backend base URL
    #[arg(
        long,
        env = "QUIRE_API_URL",
        default_value = "http://localhost:8001",
        global = true
    )]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "QUIRE_TIMEOUT", default_value_t = 30, global = true)]
    pub timeout: u64,

    /// Where the session tokens are stored
    #[arg(long, env = "QUIRE_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in, sign out and manage the session
    Auth(AuthCommand),

    /// Send an authenticated request to the API
    Request(RequestArgs),
}
