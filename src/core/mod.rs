//! Core domain types
//!
//! Tickets, their identifiers and the status state machine. Nothing in this
//! module knows about principals, storage or HTTP.

mod builders;
mod status;
mod ticket;

pub use builders::TicketBuilder;
pub use status::Status;
pub use ticket::{EmbedToken, StatusChange, Ticket, TicketId};
