//! Error types for ticket-desk
//!
//! A single error enum is shared by the credential layer, the store, the
//! lifecycle service and the HTTP surface. Each variant maps to exactly one
//! response class so callers never have to inspect messages.

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, TicketDeskError>;

/// Errors produced by ticket-desk
#[derive(Error, Debug)]
pub enum TicketDeskError {
    /// Missing, malformed, tampered or expired credential
    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    /// Login or token issuance for a principal the directory does not know
    #[error("Invalid username, password or role")]
    InvalidPrincipal,

    /// Authenticated, but not allowed to perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unknown ticket id
    #[error("Ticket not found: {id}")]
    TicketNotFound { id: String },

    /// Unknown embed token; deliberately carries no detail
    #[error("Ticket not found")]
    EmbedNotFound,

    /// Malformed payload or value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Mutation attempted on a closed ticket
    #[error("Ticket {id} is closed and can no longer be changed")]
    TicketClosed { id: String },

    /// Store-level failure (duplicate keys, corrupt snapshot, ...)
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{0}")]
    Custom(String),
}

impl TicketDeskError {
    /// Create a custom error with a message
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// True for both unknown ticket ids and unknown embed tokens
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::TicketNotFound { .. } | Self::EmbedNotFound)
    }

    /// True when the failure was caused by the caller rather than the server
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated(_)
                | Self::InvalidPrincipal
                | Self::Forbidden(_)
                | Self::TicketNotFound { .. }
                | Self::EmbedNotFound
                | Self::InvalidInput(_)
                | Self::TicketClosed { .. }
        )
    }

    /// Message suitable for showing to an end user
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            "Internal server error".to_string()
        }
    }

    /// Hints for fixing the error, shown by the CLI
    #[must_use]
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Unauthenticated(_) => vec![
                "Request a new token via POST /login".to_string(),
                "Send it as 'Authorization: Bearer <token>'".to_string(),
            ],
            Self::InvalidPrincipal => vec![
                "Check the [[users]] entries in your configuration file".to_string(),
                "Generate password hashes with 'ticket-desk hash-password'".to_string(),
            ],
            Self::Config(_) => vec![
                "Check the file passed with --config".to_string(),
                "Environment overrides use the form TICKET_DESK__SECTION__KEY".to_string(),
            ],
            Self::Io(_) | Self::Serialization(_) => {
                vec!["Check that storage.path points to a writable location".to_string()]
            },
            _ => vec![],
        }
    }
}
