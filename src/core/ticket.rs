use super::Status;
use crate::error::{Result, TicketDeskError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of a ticket
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Generate a fresh random id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn parse_str(s: &str) -> std::result::Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First eight hex characters, for log lines
    #[must_use]
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque secret granting anonymous read access to a ticket's embed view
///
/// Generated once from 122 random bits and never regenerated.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbedToken(String);

impl EmbedToken {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wrap a token presented by a caller; no validation is performed
    #[must_use]
    pub fn from_string(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep the secret out of debug logs.
impl fmt::Debug for EmbedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EmbedToken(..)")
    }
}

/// One entry of a ticket's status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: Status,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}

/// A support ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub customer_id: String,
    pub agent_id: Option<String>,
    pub subject: String,
    pub description: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,
    pub embed_token: EmbedToken,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<StatusChange>,
}

impl Ticket {
    /// Create an open, unassigned ticket owned by `customer_id`
    pub fn new(
        customer_id: impl Into<String>,
        subject: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let customer_id = customer_id.into();
        Self {
            id: TicketId::new(),
            history: vec![StatusChange {
                status: Status::Open,
                changed_by: customer_id.clone(),
                changed_at: now,
            }],
            customer_id,
            agent_id: None,
            subject: subject.into(),
            description: description.into(),
            status: Status::Open,
            resolution_notes: None,
            embed_token: EmbedToken::generate(),
            created_at: now,
            last_updated: now,
        }
    }

    #[must_use]
    pub fn is_owned_by(&self, identity: &str) -> bool {
        self.customer_id == identity
    }

    #[must_use]
    pub fn is_assigned_to(&self, identity: &str) -> bool {
        self.agent_id.as_deref() == Some(identity)
    }

    /// Assign (or reassign) the ticket to an agent
    ///
    /// The first assignment moves an open ticket to `InProgress`; later
    /// assignments leave the status alone. Assigning the current agent again
    /// changes nothing.
    pub fn assign(&mut self, agent_id: &str, assigned_by: &str, now: DateTime<Utc>) -> Result<()> {
        self.ensure_not_closed()?;
        if self.is_assigned_to(agent_id) {
            return Ok(());
        }

        self.agent_id = Some(agent_id.to_string());
        if self.status == Status::Open {
            self.record_status(Status::InProgress, assigned_by, now);
        }
        self.last_updated = now;
        Ok(())
    }

    /// Apply an agent's partial update; absent fields are left unchanged
    pub fn apply_update(
        &mut self,
        status: Option<Status>,
        resolution_notes: Option<String>,
        changed_by: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_not_closed()?;

        if status == Some(Status::Open) {
            return Err(TicketDeskError::InvalidInput(
                "An assigned ticket cannot be reopened".to_string(),
            ));
        }

        if let Some(status) = status {
            if status != self.status {
                self.record_status(status, changed_by, now);
            }
        }
        if let Some(notes) = resolution_notes {
            self.resolution_notes = Some(notes);
        }
        self.last_updated = now;
        Ok(())
    }

    fn ensure_not_closed(&self) -> Result<()> {
        if self.status.is_terminal() {
            return Err(TicketDeskError::TicketClosed {
                id: self.id.to_string(),
            });
        }
        Ok(())
    }

    fn record_status(&mut self, status: Status, changed_by: &str, now: DateTime<Utc>) {
        self.status = status;
        self.history.push(StatusChange {
            status,
            changed_by: changed_by.to_string(),
            changed_at: now,
        });
    }
}
