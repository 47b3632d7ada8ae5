use super::password;
use super::{Principal, Role};
use crate::error::{Result, TicketDeskError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Directory of known principals
///
/// Validates login credentials and answers role lookups, e.g. whether an
/// identity may be assigned tickets as an agent.
#[cfg_attr(test, mockall::automock)]
pub trait UserDirectory: Send + Sync {
    /// Check a username and password
    ///
    /// Unknown users and wrong passwords both yield `InvalidPrincipal`.
    fn authenticate(&self, username: &str, password: &str) -> Result<Principal>;

    /// Role of a known identity
    fn role_of(&self, identity: &str) -> Option<Role>;
}

/// A configured user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub username: String,
    /// Argon2 PHC string, see `ticket-desk hash-password`
    pub password_hash: String,
    pub role: Role,
}

/// Fixed directory built from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    users: HashMap<String, DirectoryEntry>,
}

impl StaticDirectory {
    /// Build a directory, rejecting duplicate usernames and malformed hashes
    pub fn new(entries: Vec<DirectoryEntry>) -> Result<Self> {
        let mut users = HashMap::with_capacity(entries.len());
        for entry in entries {
            if entry.username.trim().is_empty() {
                return Err(TicketDeskError::InvalidInput(
                    "Directory entry with empty username".to_string(),
                ));
            }
            password::validate_hash(&entry.password_hash).map_err(|e| {
                TicketDeskError::InvalidInput(format!("User '{}': {e}", entry.username))
            })?;
            if users.contains_key(&entry.username) {
                return Err(TicketDeskError::InvalidInput(format!(
                    "Duplicate directory user: {}",
                    entry.username
                )));
            }
            users.insert(entry.username.clone(), entry);
        }
        Ok(Self { users })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserDirectory for StaticDirectory {
    fn authenticate(&self, username: &str, password: &str) -> Result<Principal> {
        let Some(entry) = self.users.get(username) else {
            // Unknown users cost one verification too, against a decoy hash
            // whose result is ignored.
            if let Some(decoy) = self.users.values().next() {
                let _ = password::verify_password(password, &decoy.password_hash);
            }
            warn!("Login attempt for unknown user '{username}'");
            return Err(TicketDeskError::InvalidPrincipal);
        };

        if !password::verify_password(password, &entry.password_hash)? {
            warn!("Wrong password for user '{username}'");
            return Err(TicketDeskError::InvalidPrincipal);
        }

        debug!("User '{username}' authenticated as {}", entry.role);
        Ok(Principal::new(entry.username.clone(), entry.role))
    }

    fn role_of(&self, identity: &str) -> Option<Role> {
        self.users.get(identity).map(|entry| entry.role)
    }
}
