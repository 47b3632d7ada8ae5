//! Test utilities for ticket-desk
//!
//! Shared fixtures: a small user directory (alice and dave are customers,
//! bob and carol agents, root the admin; every password is `<name>123`)
//! plus ready-made authenticators and services built on top of it.

#![cfg(test)]

use crate::auth::{
    Authenticator, DirectoryEntry, Role, StaticDirectory, TokenIssuer, password,
};
use crate::embed::EmbedLinks;
use crate::service::TicketService;
use crate::storage::{MemoryStorage, TicketRepository};
use chrono::Duration;
use once_cell::sync::Lazy;
use std::sync::Arc;

const FIXTURE_USERS: [(&str, Role); 5] = [
    ("alice", Role::Customer),
    ("dave", Role::Customer),
    ("bob", Role::Agent),
    ("carol", Role::Agent),
    ("root", Role::Admin),
];

// Hashing is deliberately slow; do it once per test binary with minimal cost.
static FIXTURE_ENTRIES: Lazy<Vec<DirectoryEntry>> = Lazy::new(|| {
    FIXTURE_USERS
        .iter()
        .map(|(username, role)| DirectoryEntry {
            username: (*username).to_string(),
            password_hash: password::hash_password_with_cost(&format!("{username}123"), 1024, 1, 1)
                .expect("Failed to hash fixture password"),
            role: *role,
        })
        .collect()
});

/// Directory entries for the fixture users
pub fn fixture_entries() -> Vec<DirectoryEntry> {
    FIXTURE_ENTRIES.clone()
}

/// Directory holding the fixture users
pub fn fixture_directory() -> Arc<StaticDirectory> {
    Arc::new(StaticDirectory::new(fixture_entries()).expect("Failed to build fixture directory"))
}

/// Authenticator over the fixture directory with a 30 minute token lifetime
pub fn fixture_authenticator() -> Authenticator {
    Authenticator::new(
        fixture_directory(),
        TokenIssuer::with_random_secret(),
        Duration::minutes(30),
    )
}

/// Lifecycle service over an empty in-memory store
pub fn fixture_service() -> TicketService {
    fixture_service_with_store(Arc::new(MemoryStorage::new()))
}

/// Lifecycle service over the given store
pub fn fixture_service_with_store(store: Arc<dyn TicketRepository>) -> TicketService {
    TicketService::new(store, fixture_directory(), EmbedLinks::default())
}
