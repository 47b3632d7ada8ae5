//! Ticket storage
//!
//! The lifecycle service talks to storage only through [`TicketRepository`].
//! [`MemoryStorage`] keeps everything in process; [`FileStorage`] adds a
//! YAML snapshot so tickets survive restarts.

mod file;
mod memory;
mod repository;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use repository::{Mutation, TicketRepository};
