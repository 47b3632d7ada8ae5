//! Command-line interface
//!
//! ```text
//! ticket-desk [--config PATH] [--verbose] [--json] [--no-color] <COMMAND>
//!
//!   serve           run the HTTP API
//!   hash-password   print an Argon2 hash for a [[users]] entry
//!   token           issue an access token for a configured user
//! ```

pub mod handlers;
mod output;

pub use output::OutputFormatter;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ticket-desk", version, about = "Support ticket desk server", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML or YAML)
    #[arg(short, long, global = true, env = "TICKET_DESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    #[cfg(feature = "api")]
    Serve {
        /// Address to bind, overrides server.host
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overrides server.port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Hash a password for a directory entry
    HashPassword {
        password: String,
    },

    /// Issue an access token for a configured user
    Token {
        username: String,

        /// Token lifetime, defaults to auth.token_ttl_minutes
        #[arg(long)]
        ttl_minutes: Option<i64>,
    },
}
