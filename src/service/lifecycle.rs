use crate::access::{Decision, ListScope, Operation, authorize};
use crate::auth::{Principal, Role, UserDirectory};
use crate::core::{EmbedToken, Status, Ticket, TicketId};
use crate::embed::{EmbedLinks, EmbedView};
use crate::error::{Result, TicketDeskError};
use crate::storage::TicketRepository;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Longest accepted subject, in characters
pub const MAX_SUBJECT_LEN: usize = 200;

/// Payload for creating a ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    pub subject: String,
    pub description: String,
}

impl NewTicket {
    pub fn new(subject: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            description: description.into(),
        }
    }

    fn validate(self) -> Result<Self> {
        let subject = self.subject.trim();
        if subject.is_empty() {
            return Err(TicketDeskError::InvalidInput(
                "Subject must not be empty".to_string(),
            ));
        }
        if subject.chars().count() > MAX_SUBJECT_LEN {
            return Err(TicketDeskError::InvalidInput(format!(
                "Subject must be at most {MAX_SUBJECT_LEN} characters"
            )));
        }
        if self.description.trim().is_empty() {
            return Err(TicketDeskError::InvalidInput(
                "Description must not be empty".to_string(),
            ));
        }
        Ok(Self {
            subject: subject.to_string(),
            description: self.description,
        })
    }
}

/// Partial update by the assigned agent; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketUpdate {
    pub status: Option<Status>,
    pub resolution_notes: Option<String>,
}

impl TicketUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.resolution_notes.is_none()
    }
}

/// Ticket lifecycle operations
///
/// Every mutating operation runs as one [`TicketRepository::update`] call,
/// with the authorization check repeated inside it, so a concurrent
/// reassignment can never let a stale agent write.
pub struct TicketService {
    store: Arc<dyn TicketRepository>,
    directory: Arc<dyn UserDirectory>,
    links: EmbedLinks,
}

impl TicketService {
    pub fn new(
        store: Arc<dyn TicketRepository>,
        directory: Arc<dyn UserDirectory>,
        links: EmbedLinks,
    ) -> Self {
        Self {
            store,
            directory,
            links,
        }
    }

    #[must_use]
    pub const fn links(&self) -> &EmbedLinks {
        &self.links
    }

    /// Open a new ticket owned by the calling customer
    pub fn create_ticket(&self, principal: &Principal, request: NewTicket) -> Result<Ticket> {
        ensure_allowed(authorize(Operation::CreateTicket, Some(principal), None), principal)?;
        let request = request.validate()?;

        let ticket = Ticket::new(&principal.identity, request.subject, request.description);
        self.store.create(ticket.clone())?;
        info!("{principal} opened ticket {}", ticket.id.short());
        Ok(ticket)
    }

    /// Load one ticket, subject to ownership and assignment checks
    pub fn get_ticket(&self, principal: &Principal, id: &TicketId) -> Result<Ticket> {
        let ticket = self.load(id)?;
        ensure_allowed(
            authorize(Operation::ReadTicket, Some(principal), Some(&ticket)),
            principal,
        )?;
        debug!("{principal} read ticket {}", id.short());
        Ok(ticket)
    }

    /// Tickets visible to the principal: own, assigned or all, by role
    pub fn list_tickets(
        &self,
        principal: &Principal,
        status_filter: Option<Status>,
    ) -> Result<Vec<Ticket>> {
        ensure_allowed(authorize(Operation::ListTickets, Some(principal), None), principal)?;
        self.list_scoped(principal, status_filter)
    }

    /// A customer's own tickets
    pub fn list_own_tickets(
        &self,
        principal: &Principal,
        status_filter: Option<Status>,
    ) -> Result<Vec<Ticket>> {
        ensure_allowed(authorize(Operation::ListOwnTickets, Some(principal), None), principal)?;
        self.list_scoped(principal, status_filter)
    }

    /// The working queue: assigned tickets for agents, everything for admins
    pub fn list_ticket_queue(
        &self,
        principal: &Principal,
        status_filter: Option<Status>,
    ) -> Result<Vec<Ticket>> {
        ensure_allowed(authorize(Operation::ListTicketQueue, Some(principal), None), principal)?;
        self.list_scoped(principal, status_filter)
    }

    /// Change status and/or resolution notes as the assigned agent
    pub fn update_ticket(
        &self,
        principal: &Principal,
        id: &TicketId,
        update: TicketUpdate,
    ) -> Result<Ticket> {
        let ticket = self.store.update(
            id,
            Box::new(|ticket: &mut Ticket| -> Result<()> {
                ensure_allowed(
                    authorize(Operation::UpdateTicket, Some(principal), Some(&*ticket)),
                    principal,
                )?;
                if update.is_empty() {
                    return Err(TicketDeskError::InvalidInput(
                        "Provide a status, resolution notes or both".to_string(),
                    ));
                }
                ticket.apply_update(
                    update.status,
                    update.resolution_notes,
                    &principal.identity,
                    Utc::now(),
                )
            }),
        )?;

        info!("{principal} updated ticket {} ({})", id.short(), ticket.status);
        Ok(ticket)
    }

    /// Assign an agent to a ticket as an admin
    pub fn assign_ticket(
        &self,
        principal: &Principal,
        id: &TicketId,
        agent_id: &str,
    ) -> Result<Ticket> {
        ensure_allowed(authorize(Operation::AssignTicket, Some(principal), None), principal)?;

        let agent_id = agent_id.trim();
        if self.directory.role_of(agent_id) != Some(Role::Agent) {
            return Err(TicketDeskError::InvalidInput(format!(
                "'{agent_id}' is not a known agent"
            )));
        }

        let ticket = self.store.update(
            id,
            Box::new(|ticket: &mut Ticket| ticket.assign(agent_id, &principal.identity, Utc::now())),
        )?;

        info!("{principal} assigned ticket {} to {agent_id}", id.short());
        Ok(ticket)
    }

    /// Public projection looked up by embed token
    ///
    /// Unknown tokens always yield `EmbedNotFound`, whatever the reason.
    pub fn embed_view(&self, token: &str) -> Result<EmbedView> {
        if !authorize(Operation::ReadEmbed, None, None).is_allowed() {
            return Err(TicketDeskError::EmbedNotFound);
        }
        let ticket = self
            .store
            .get_by_embed_token(&EmbedToken::from_string(token))?
            .ok_or(TicketDeskError::EmbedNotFound)?;
        Ok(self.links.view(&ticket))
    }

    fn load(&self, id: &TicketId) -> Result<Ticket> {
        self.store
            .get(id)?
            .ok_or_else(|| TicketDeskError::TicketNotFound { id: id.to_string() })
    }

    fn list_scoped(&self, principal: &Principal, status_filter: Option<Status>) -> Result<Vec<Ticket>> {
        let mut tickets = match ListScope::for_principal(principal) {
            ListScope::Owner(customer) => self.store.list_by_customer(&customer)?,
            ListScope::Assigned(agent) => self.store.list_by_agent(&agent)?,
            ListScope::All => self.store.list_all()?,
        };
        if let Some(status) = status_filter {
            tickets.retain(|ticket| ticket.status == status);
        }
        debug!("{principal} listed {} tickets", tickets.len());
        Ok(tickets)
    }
}

fn ensure_allowed(decision: Decision, principal: &Principal) -> Result<()> {
    match decision {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            warn!("Denied {principal}: {reason}");
            Err(TicketDeskError::Forbidden(reason.to_string()))
        },
    }
}
