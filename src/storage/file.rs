use super::memory::Pending;
use super::{MemoryStorage, Mutation, TicketRepository};
use crate::core::{EmbedToken, Ticket, TicketId};
use crate::error::{Result, TicketDeskError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    tickets: Vec<Ticket>,
}

/// Ticket store persisted as a YAML snapshot
///
/// Reads are served from memory. Every write rewrites the snapshot through
/// a temporary file and a rename before the in-memory state changes, so a
/// crash leaves either the old or the new snapshot on disk, and a failed
/// write leaves memory untouched.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    inner: MemoryStorage,
}

impl FileStorage {
    /// Open the snapshot at `path`, starting empty if it does not exist
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let inner = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let snapshot: Snapshot = serde_yaml::from_str(&content)?;
            if snapshot.version != SNAPSHOT_VERSION {
                return Err(TicketDeskError::Storage(format!(
                    "Unsupported snapshot version {} in {}",
                    snapshot.version,
                    path.display()
                )));
            }
            info!(
                "Loaded {} tickets from {}",
                snapshot.tickets.len(),
                path.display()
            );
            MemoryStorage::from_tickets(snapshot.tickets)?
        } else {
            info!("No snapshot at {}, starting empty", path.display());
            MemoryStorage::new()
        };

        Ok(Self { path, inner })
    }

    /// Location of the snapshot file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, pending: Pending<'_>) -> Result<()> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            tickets: pending.tickets(),
        };
        let content = serde_yaml::to_string(&snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = self.path.with_extension("yaml.tmp");
        fs::write(&tmp_path, content)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        debug!("Wrote snapshot of {} tickets", snapshot.tickets.len());
        Ok(())
    }
}

impl TicketRepository for FileStorage {
    fn create(&self, ticket: Ticket) -> Result<TicketId> {
        self.inner
            .create_then(ticket, |pending| self.persist(pending))
    }

    fn get(&self, id: &TicketId) -> Result<Option<Ticket>> {
        self.inner.get(id)
    }

    fn get_by_embed_token(&self, token: &EmbedToken) -> Result<Option<Ticket>> {
        self.inner.get_by_embed_token(token)
    }

    fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Ticket>> {
        self.inner.list_by_customer(customer_id)
    }

    fn list_by_agent(&self, agent_id: &str) -> Result<Vec<Ticket>> {
        self.inner.list_by_agent(agent_id)
    }

    fn list_all(&self) -> Result<Vec<Ticket>> {
        self.inner.list_all()
    }

    fn update(&self, id: &TicketId, mutation: Mutation<'_>) -> Result<Ticket> {
        self.inner
            .update_then(id, mutation, |pending| self.persist(pending))
    }
}
