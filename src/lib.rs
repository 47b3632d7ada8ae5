//! ticket-desk - A support ticket backend
//!
//! Customers open tickets, admins assign them to agents, agents drive them
//! to resolution, and anyone holding a ticket's embed token can see a
//! minimal read-only view of it.
//!
//! - `auth`: login, signed expiring tokens, principals and roles
//! - `access`: the single authorization policy
//! - `storage`: ticket repositories (in memory, or with a YAML snapshot)
//! - `service`: the ticket lifecycle
//! - `api`: the axum HTTP surface (feature `api`, on by default)

// Allow missing error documentation for internal implementations
#![allow(clippy::missing_errors_doc)]
// Allow some pedantic lints that don't improve code quality
#![allow(clippy::option_if_let_else)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::indexing_slicing)]

//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ticket_desk::auth::Principal;
//! use ticket_desk::embed::EmbedLinks;
//! use ticket_desk::service::{NewTicket, TicketService};
//! use ticket_desk::storage::MemoryStorage;
//!
//! let service = TicketService::new(Arc::new(MemoryStorage::new()), directory, EmbedLinks::default());
//! let ticket = service.create_ticket(&Principal::customer("alice"), NewTicket::new("VPN", "Drops"))?;
//! let view = service.embed_view(ticket.embed_token.as_str())?;
//! ```

pub mod access;
pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod embed;
pub mod error;
pub mod service;
pub mod storage;

#[cfg(feature = "api")]
pub mod api;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{Result, TicketDeskError};
