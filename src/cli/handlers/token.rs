use crate::auth::UserDirectory;
use crate::cli::OutputFormatter;
use crate::config::{Settings, token_ttl_from_minutes};
use crate::error::{Result, TicketDeskError};
use chrono::Utc;

/// Handler for `ticket-desk token`
///
/// Issues a token for a configured user without a password, for operators
/// and scripts. Requires a fixed `auth.jwt_secret`; a token signed with a
/// throwaway secret would be useless to the running server.
pub fn handle_token(
    settings: &Settings,
    username: &str,
    ttl_minutes: Option<i64>,
    output: &OutputFormatter,
) -> Result<()> {
    if settings.auth.jwt_secret.is_none() {
        return Err(TicketDeskError::custom(
            "auth.jwt_secret must be configured to issue tokens from the command line",
        ));
    }
    let ttl = match ttl_minutes {
        Some(minutes) => token_ttl_from_minutes("--ttl-minutes", minutes)?,
        None => settings.auth.token_ttl()?,
    };

    let directory = settings.directory()?;
    let role = directory
        .role_of(username)
        .ok_or(TicketDeskError::InvalidPrincipal)?;
    let authenticator = settings.authenticator(directory)?;
    let token = authenticator.issue(username, role, ttl)?;

    if output.is_json() {
        output.print_json(&serde_json::json!({
            "access_token": token,
            "token_type": "bearer",
            "role": role,
            "expires_at": Utc::now() + ttl,
        }))?;
    } else {
        output.plain(&token);
    }
    Ok(())
}
