//! ticket-desk - Support ticket desk server
//!
//! This is the main entry point for the ticket-desk CLI application.
//! It parses arguments, loads settings and dispatches to the command
//! handlers.

use clap::Parser;
use std::process;
use ticket_desk::cli::{Cli, Commands, OutputFormatter, handlers};
use ticket_desk::config::Settings;
use ticket_desk::error::{Result, TicketDeskError};
use tracing_subscriber::EnvFilter;

/// Main entry point for the ticket-desk CLI
fn main() {
    let cli = Cli::parse();
    let formatter = OutputFormatter::new(cli.json, cli.no_color);

    if let Err(e) = run(cli, &formatter) {
        handle_error(&e, &formatter);
        process::exit(1);
    }
}

/// Run the CLI application with the parsed arguments
///
/// # Errors
///
/// Returns any error that occurs while loading settings or executing the
/// command
fn run(cli: Cli, formatter: &OutputFormatter) -> Result<()> {
    init_logging(cli.verbose);

    match cli.command {
        Commands::HashPassword { password } => handlers::handle_hash_password(&password, formatter),
        Commands::Token {
            username,
            ttl_minutes,
        } => {
            let settings = Settings::load(cli.config.as_deref())?;
            handlers::handle_token(&settings, &username, ttl_minutes, formatter)
        },
        #[cfg(feature = "api")]
        Commands::Serve { host, port } => {
            let settings = Settings::load(cli.config.as_deref())?;
            handlers::handle_serve(settings, host, port, formatter)
        },
    }
}

/// Logs go to stderr so stdout stays clean for hashes, tokens and JSON
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Handle errors and display them to the user
///
/// Prints the message and any suggestions; in JSON mode the error is also
/// emitted as a JSON object on stdout.
fn handle_error(error: &TicketDeskError, formatter: &OutputFormatter) {
    formatter.error(&error.to_string());

    let suggestions = error.suggestions();
    if !suggestions.is_empty() && !formatter.is_json() {
        eprintln!("\nSuggestions:");
        for suggestion in &suggestions {
            eprintln!("  • {suggestion}");
        }
    }

    if formatter.is_json() {
        let _ = formatter.print_json(&serde_json::json!({
            "status": "error",
            "error": error.to_string(),
            "suggestions": suggestions,
        }));
    }

    if tracing::enabled!(tracing::Level::DEBUG) {
        eprintln!("\nDebug information:");
        eprintln!("{error:?}");
    }
}
