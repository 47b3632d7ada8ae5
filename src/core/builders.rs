use super::{EmbedToken, Status, StatusChange, Ticket, TicketId};
use chrono::{DateTime, Utc};

/// Builder for creating Ticket instances
///
/// Unlike [`Ticket::new`] it does not seed the status history, so fixtures
/// can describe tickets in any state.
#[derive(Default)]
pub struct TicketBuilder {
    id: Option<TicketId>,
    customer_id: Option<String>,
    agent_id: Option<String>,
    subject: Option<String>,
    description: Option<String>,
    status: Option<Status>,
    resolution_notes: Option<String>,
    embed_token: Option<EmbedToken>,
    created_at: Option<DateTime<Utc>>,
    last_updated: Option<DateTime<Utc>>,
    history: Vec<StatusChange>,
}

impl TicketBuilder {
    /// Create a new ticket builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ticket ID
    #[must_use]
    pub fn id(mut self, id: TicketId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the owning customer
    #[must_use]
    pub fn customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    /// Set the assigned agent
    #[must_use]
    pub fn agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Set the subject
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the status
    #[must_use]
    pub const fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Set resolution notes
    #[must_use]
    pub fn resolution_notes(mut self, notes: impl Into<String>) -> Self {
        self.resolution_notes = Some(notes.into());
        self
    }

    /// Set the embed token
    #[must_use]
    pub fn embed_token(mut self, token: EmbedToken) -> Self {
        self.embed_token = Some(token);
        self
    }

    /// Set `created_at` timestamp
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Set `last_updated` timestamp
    #[must_use]
    pub const fn last_updated(mut self, last_updated: DateTime<Utc>) -> Self {
        self.last_updated = Some(last_updated);
        self
    }

    /// Add a history entry
    #[must_use]
    pub fn history_entry(mut self, change: StatusChange) -> Self {
        self.history.push(change);
        self
    }

    /// Build the ticket
    pub fn build(self) -> Ticket {
        let created_at = self.created_at.unwrap_or_else(Utc::now);
        Ticket {
            id: self.id.unwrap_or_default(),
            customer_id: self.customer_id.unwrap_or_default(),
            agent_id: self.agent_id,
            subject: self.subject.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            resolution_notes: self.resolution_notes,
            embed_token: self.embed_token.unwrap_or_else(EmbedToken::generate),
            created_at,
            last_updated: self.last_updated.unwrap_or(created_at),
            history: self.history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_builder() {
        let ticket = TicketBuilder::new()
            .customer("alice")
            .agent("bob")
            .subject("Printer on fire")
            .description("Smoke everywhere")
            .status(Status::InProgress)
            .resolution_notes("Extinguisher dispatched")
            .build();

        assert_eq!(ticket.customer_id, "alice");
        assert_eq!(ticket.agent_id.as_deref(), Some("bob"));
        assert_eq!(ticket.subject, "Printer on fire");
        assert_eq!(ticket.status, Status::InProgress);
        assert_eq!(ticket.created_at, ticket.last_updated);
        assert!(ticket.history.is_empty());
    }

    #[test]
    fn test_builder_defaults() {
        let ticket = TicketBuilder::new().build();

        assert_eq!(ticket.status, Status::Open);
        assert!(ticket.agent_id.is_none());
        assert!(!ticket.embed_token.as_str().is_empty());
    }
}
