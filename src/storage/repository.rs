use crate::core::{EmbedToken, Ticket, TicketId};
use crate::error::Result;

/// Read-modify-write applied to a single ticket under the store's lock
///
/// Returning an error aborts the mutation; the stored ticket is untouched.
pub type Mutation<'a> = Box<dyn FnOnce(&mut Ticket) -> Result<()> + Send + 'a>;

/// Repository trait for ticket storage operations
///
/// This trait defines the interface for storing and retrieving tickets,
/// allowing for different storage implementations. Implementations must
/// serialize mutations of the same ticket and keep the embed-token index
/// unique.
pub trait TicketRepository: Send + Sync {
    /// Stores a new ticket and returns its id
    fn create(&self, ticket: Ticket) -> Result<TicketId>;

    /// Loads a ticket by ID
    fn get(&self, id: &TicketId) -> Result<Option<Ticket>>;

    /// Loads a ticket by its embed token
    fn get_by_embed_token(&self, token: &EmbedToken) -> Result<Option<Ticket>>;

    /// Tickets created by a customer, oldest first
    fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Ticket>>;

    /// Tickets assigned to an agent, oldest first
    fn list_by_agent(&self, agent_id: &str) -> Result<Vec<Ticket>>;

    /// Every ticket, oldest first
    fn list_all(&self) -> Result<Vec<Ticket>>;

    /// Atomically applies `mutation` and returns the updated ticket
    ///
    /// Fails with `TicketNotFound` for unknown ids.
    fn update(&self, id: &TicketId, mutation: Mutation<'_>) -> Result<Ticket>;
}
