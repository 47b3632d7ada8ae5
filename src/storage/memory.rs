use super::{Mutation, TicketRepository};
use crate::core::{EmbedToken, Ticket, TicketId};
use crate::error::{Result, TicketDeskError};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
struct Tables {
    tickets: HashMap<TicketId, Ticket>,
    /// Creation order
    order: Vec<TicketId>,
    by_embed_token: HashMap<EmbedToken, TicketId>,
    by_customer: HashMap<String, Vec<TicketId>>,
    by_agent: HashMap<String, Vec<TicketId>>,
}

impl Tables {
    fn check_new(&self, ticket: &Ticket) -> Result<()> {
        if self.tickets.contains_key(&ticket.id) {
            return Err(TicketDeskError::Storage(format!(
                "Duplicate ticket id {}",
                ticket.id
            )));
        }
        if self.by_embed_token.contains_key(&ticket.embed_token) {
            return Err(TicketDeskError::Storage(
                "Duplicate embed token".to_string(),
            ));
        }
        Ok(())
    }

    fn insert(&mut self, ticket: Ticket) -> Result<TicketId> {
        self.check_new(&ticket)?;
        let id = ticket.id.clone();
        self.order.push(id.clone());
        self.by_embed_token
            .insert(ticket.embed_token.clone(), id.clone());
        self.by_customer
            .entry(ticket.customer_id.clone())
            .or_default()
            .push(id.clone());
        if let Some(agent) = &ticket.agent_id {
            self.by_agent.entry(agent.clone()).or_default().push(id.clone());
        }
        self.tickets.insert(id.clone(), ticket);
        Ok(id)
    }

    fn collect(&self, ids: Option<&Vec<TicketId>>) -> Vec<Ticket> {
        ids.map(|ids| {
            ids.iter()
                .filter_map(|id| self.tickets.get(id).cloned())
                .collect()
        })
        .unwrap_or_default()
    }

    /// Apply `mutation` to a copy of the stored ticket
    fn staged_update(&self, id: &TicketId, mutation: Mutation<'_>) -> Result<Ticket> {
        let current = self
            .tickets
            .get(id)
            .ok_or_else(|| TicketDeskError::TicketNotFound { id: id.to_string() })?;

        let mut updated = current.clone();
        mutation(&mut updated)?;

        // Identity fields are immutable regardless of what the mutation did.
        updated.id = current.id.clone();
        updated.customer_id = current.customer_id.clone();
        updated.embed_token = current.embed_token.clone();
        updated.created_at = current.created_at;
        Ok(updated)
    }

    fn replace(&mut self, updated: Ticket) {
        let id = updated.id.clone();
        let old_agent = self.tickets.get(&id).and_then(|t| t.agent_id.clone());
        self.reindex_agent(&id, old_agent.as_deref(), updated.agent_id.as_deref());
        self.tickets.insert(id, updated);
    }

    fn reindex_agent(&mut self, id: &TicketId, old: Option<&str>, new: Option<&str>) {
        if old == new {
            return;
        }
        if let Some(old) = old {
            if let Some(ids) = self.by_agent.get_mut(old) {
                ids.retain(|existing| existing != id);
                if ids.is_empty() {
                    self.by_agent.remove(old);
                }
            }
        }
        if let Some(new) = new {
            let order = &self.order;
            let rank = |ticket: &TicketId| {
                order
                    .iter()
                    .position(|existing| existing == ticket)
                    .unwrap_or(usize::MAX)
            };
            let own_rank = rank(id);
            let ids = self.by_agent.entry(new.to_string()).or_default();
            // Keep the agent's list in creation order.
            let position = ids
                .iter()
                .position(|existing| rank(existing) > own_rank)
                .unwrap_or(ids.len());
            ids.insert(position, id.clone());
        }
    }
}

/// Store contents as they will be once a pending write commits
pub(crate) struct Pending<'a> {
    tables: &'a Tables,
    ticket: &'a Ticket,
}

impl Pending<'_> {
    /// All tickets in creation order, the pending one included
    pub(crate) fn tickets(&self) -> Vec<Ticket> {
        let mut tickets: Vec<Ticket> = self
            .tables
            .order
            .iter()
            .filter_map(|id| {
                if *id == self.ticket.id {
                    Some(self.ticket.clone())
                } else {
                    self.tables.tickets.get(id).cloned()
                }
            })
            .collect();
        if !self.tables.tickets.contains_key(&self.ticket.id) {
            tickets.push(self.ticket.clone());
        }
        tickets
    }
}

/// In-process ticket store
///
/// A single `RwLock` guards the ticket table and its indexes, so every
/// mutation is applied and re-indexed as one step. Embed-token, customer and
/// agent lookups are hash lookups.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from previously persisted tickets
    pub fn from_tickets(tickets: impl IntoIterator<Item = Ticket>) -> Result<Self> {
        let mut tables = Tables::default();
        for ticket in tickets {
            tables.insert(ticket)?;
        }
        Ok(Self {
            tables: RwLock::new(tables),
        })
    }

    /// Number of stored tickets
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.read().tickets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert `ticket` once `commit` accepts the resulting contents
    ///
    /// `commit` runs under the write lock; when it fails nothing changes.
    pub(crate) fn create_then(
        &self,
        ticket: Ticket,
        commit: impl FnOnce(Pending<'_>) -> Result<()>,
    ) -> Result<TicketId> {
        let mut tables = self.tables.write();
        tables.check_new(&ticket)?;
        commit(Pending {
            tables: &*tables,
            ticket: &ticket,
        })?;
        let id = tables.insert(ticket)?;
        debug!("Stored ticket {}", id.short());
        Ok(id)
    }

    /// Update a ticket once `commit` accepts the resulting contents
    pub(crate) fn update_then(
        &self,
        id: &TicketId,
        mutation: Mutation<'_>,
        commit: impl FnOnce(Pending<'_>) -> Result<()>,
    ) -> Result<Ticket> {
        let mut tables = self.tables.write();
        let updated = tables.staged_update(id, mutation)?;
        commit(Pending {
            tables: &*tables,
            ticket: &updated,
        })?;
        tables.replace(updated.clone());
        Ok(updated)
    }
}

impl TicketRepository for MemoryStorage {
    fn create(&self, ticket: Ticket) -> Result<TicketId> {
        self.create_then(ticket, |_| Ok(()))
    }

    fn get(&self, id: &TicketId) -> Result<Option<Ticket>> {
        Ok(self.tables.read().tickets.get(id).cloned())
    }

    fn get_by_embed_token(&self, token: &EmbedToken) -> Result<Option<Ticket>> {
        let tables = self.tables.read();
        Ok(tables
            .by_embed_token
            .get(token)
            .and_then(|id| tables.tickets.get(id))
            .cloned())
    }

    fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Ticket>> {
        let tables = self.tables.read();
        Ok(tables.collect(tables.by_customer.get(customer_id)))
    }

    fn list_by_agent(&self, agent_id: &str) -> Result<Vec<Ticket>> {
        let tables = self.tables.read();
        Ok(tables.collect(tables.by_agent.get(agent_id)))
    }

    fn list_all(&self) -> Result<Vec<Ticket>> {
        let tables = self.tables.read();
        Ok(tables.collect(Some(&tables.order)))
    }

    fn update(&self, id: &TicketId, mutation: Mutation<'_>) -> Result<Ticket> {
        self.update_then(id, mutation, |_| Ok(()))
    }
}
