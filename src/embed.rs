//! Public, unauthenticated view of a ticket
//!
//! [`EmbedView`] is the only shape the embed endpoint ever serializes. It has
//! no field for the description, the customer, the agent or the embed token,
//! so nothing else can leak through it.

use crate::core::{Status, Ticket, TicketId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only projection served at `/tickets/embed/{token}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedView {
    pub subject: String,
    pub status: Status,
    pub last_updated: DateTime<Utc>,
    pub link: String,
}

/// Builds stable links to tickets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedLinks {
    base_url: String,
}

impl EmbedLinks {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base_url}/tickets/{id}`
    #[must_use]
    pub fn ticket_link(&self, id: &TicketId) -> String {
        format!("{}/tickets/{id}", self.base_url)
    }

    /// Project a ticket onto its public fields
    #[must_use]
    pub fn view(&self, ticket: &Ticket) -> EmbedView {
        EmbedView {
            subject: ticket.subject.clone(),
            status: ticket.status,
            last_updated: ticket.last_updated,
            link: self.ticket_link(&ticket.id),
        }
    }
}

impl Default for EmbedLinks {
    fn default() -> Self {
        Self::new("https://support.example.com")
    }
}
