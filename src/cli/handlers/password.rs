use crate::auth::password;
use crate::cli::OutputFormatter;
use crate::error::{Result, TicketDeskError};

/// Handler for `ticket-desk hash-password`
pub fn handle_hash_password(plaintext: &str, output: &OutputFormatter) -> Result<()> {
    if plaintext.is_empty() {
        return Err(TicketDeskError::InvalidInput(
            "Password must not be empty".to_string(),
        ));
    }

    let hash = password::hash_password(plaintext)?;
    if output.is_json() {
        output.print_json(&serde_json::json!({ "password_hash": hash }))?;
    } else {
        output.plain(&hash);
    }
    Ok(())
}
