//! Ticket lifecycle
//!
//! [`TicketService`] composes the store, the access policy and the user
//! directory. Handlers hand it an authenticated [`Principal`](crate::auth::Principal)
//! and get back tickets or typed errors; nothing above this layer makes
//! authorization decisions.

mod lifecycle;

pub use lifecycle::{MAX_SUBJECT_LEN, NewTicket, TicketService, TicketUpdate};
