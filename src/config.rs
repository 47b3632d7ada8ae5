//! Layered configuration
//!
//! Settings are resolved from built-in defaults, then an optional file
//! (TOML or YAML, chosen by extension), then environment variables of the
//! form `TICKET_DESK__SECTION__KEY`, e.g. `TICKET_DESK__SERVER__PORT=9000`.
//!
//! ```toml
//! [server]
//! port = 9000
//!
//! [auth]
//! jwt_secret = "at-least-thirty-two-bytes-of-secret-material"
//!
//! [[users]]
//! username = "bob"
//! password_hash = "$argon2id$v=19$..."
//! role = "agent"
//! ```

use crate::auth::{Authenticator, DirectoryEntry, StaticDirectory, TokenIssuer};
use crate::embed::EmbedLinks;
use crate::error::{Result, TicketDeskError};
use crate::service::TicketService;
use crate::storage::{FileStorage, MemoryStorage, TicketRepository};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "TICKET_DESK";

/// Longest accepted token lifetime, one year
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

/// Token lifetime from a minute count, `name` labels the offending setting
pub fn token_ttl_from_minutes(name: &str, minutes: i64) -> Result<chrono::Duration> {
    if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) {
        return Err(TicketDeskError::InvalidInput(format!(
            "{name} must be between 1 and {MAX_TOKEN_TTL_MINUTES}, got {minutes}"
        )));
    }
    chrono::Duration::try_minutes(minutes).ok_or_else(|| {
        TicketDeskError::InvalidInput(format!("{name} out of range: {minutes}"))
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub embed: EmbedSettings,
    pub storage: StorageSettings,
    pub users: Vec<DirectoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerSettings {
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HS256 signing secret; a random one is generated when absent
    pub jwt_secret: Option<String>,
    pub token_ttl_minutes: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_minutes: 30,
        }
    }
}

// Never print the secret.
impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .finish()
    }
}

impl AuthSettings {
    pub fn token_ttl(&self) -> Result<chrono::Duration> {
        token_ttl_from_minutes("auth.token_ttl_minutes", self.token_ttl_minutes)
    }

    pub fn token_issuer(&self) -> Result<TokenIssuer> {
        match &self.jwt_secret {
            Some(secret) => TokenIssuer::new(secret.as_bytes()),
            None => {
                warn!("No auth.jwt_secret configured; tokens will not survive a restart");
                Ok(TokenIssuer::with_random_secret())
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedSettings {
    /// Base of the links handed out in embed views
    pub base_url: String,
}

impl Default for EmbedSettings {
    fn default() -> Self {
        Self {
            base_url: "https://support.example.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// YAML snapshot location; tickets live only in memory when unset
    pub path: Option<PathBuf>,
}

impl Settings {
    /// Load defaults, the optional file and process environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings: Self = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        self.auth.token_ttl()?;
        if !self.embed.base_url.starts_with("http://") && !self.embed.base_url.starts_with("https://")
        {
            return Err(TicketDeskError::InvalidInput(format!(
                "embed.base_url must be an http(s) URL, got '{}'",
                self.embed.base_url
            )));
        }
        Ok(())
    }

    pub fn directory(&self) -> Result<Arc<StaticDirectory>> {
        let directory = StaticDirectory::new(self.users.clone())?;
        if directory.is_empty() {
            warn!("No users configured; nobody can log in");
        }
        Ok(Arc::new(directory))
    }

    pub fn authenticator(&self, directory: Arc<StaticDirectory>) -> Result<Authenticator> {
        Ok(Authenticator::new(
            directory,
            self.auth.token_issuer()?,
            self.auth.token_ttl()?,
        ))
    }

    pub fn open_store(&self) -> Result<Arc<dyn TicketRepository>> {
        match &self.storage.path {
            Some(path) => Ok(Arc::new(FileStorage::open(path)?)),
            None => {
                info!("Using in-memory ticket storage");
                Ok(Arc::new(MemoryStorage::new()))
            },
        }
    }

    pub fn ticket_service(&self, directory: Arc<StaticDirectory>) -> Result<TicketService> {
        Ok(TicketService::new(
            self.open_store()?,
            directory,
            EmbedLinks::new(&self.embed.base_url),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn no_env() -> Environment {
        Settings::environment().source(Some(HashMap::new()))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_with_env(None, no_env()).unwrap();

        assert_eq!(settings.server.bind_address(), "127.0.0.1:8080");
        assert_eq!(settings.auth.token_ttl().unwrap(), chrono::Duration::minutes(30));
        assert_eq!(settings.embed.base_url, "https://support.example.com");
        assert!(settings.storage.path.is_none());
        assert!(settings.users.is_empty());
    }

    #[test]
    fn test_file_then_env() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ticket-desk.toml");
        fs::write(
            &path,
            r#"
[server]
port = 9000

[embed]
base_url = "https://help.example.org"

[[users]]
username = "bob"
password_hash = "$argon2id$v=19$m=1024,t=1,p=1$c2FsdHNhbHRzYWx0$YmFzZTY0aGFzaGJhc2U2NGhhc2g"
role = "agent"
"#,
        )
        .unwrap();

        let env = Settings::environment().source(Some(HashMap::from([(
            "TICKET_DESK__SERVER__PORT".to_string(),
            "9100".to_string(),
        )])));
        let settings = Settings::load_with_env(Some(&path), env).unwrap();

        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.embed.base_url, "https://help.example.org");
        assert_eq!(settings.users.len(), 1);
        assert_eq!(settings.users[0].role, Role::Agent);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = Settings::load_with_env(Some(&temp_dir.path().join("absent.toml")), no_env());
        assert!(matches!(result, Err(TicketDeskError::Config(_))));
    }

    #[test]
    fn test_validate() {
        let mut settings = Settings::default();
        settings.auth.token_ttl_minutes = 0;
        assert!(settings.validate().is_err());

        settings.auth.token_ttl_minutes = MAX_TOKEN_TTL_MINUTES;
        assert!(settings.validate().is_ok());

        let mut settings = Settings::default();
        settings.embed.base_url = "support.example.com".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_huge_token_ttl_rejected_without_panic() {
        let mut settings = Settings::default();
        settings.auth.token_ttl_minutes = i64::MAX;
        assert!(matches!(
            settings.validate(),
            Err(TicketDeskError::InvalidInput(_))
        ));
        assert!(settings.auth.token_ttl().is_err());
        assert!(settings
            .authenticator(Arc::new(StaticDirectory::default()))
            .is_err());

        let env = Settings::environment().source(Some(HashMap::from([(
            "TICKET_DESK__AUTH__TOKEN_TTL_MINUTES".to_string(),
            "1000000000000".to_string(),
        )])));
        assert!(matches!(
            Settings::load_with_env(None, env),
            Err(TicketDeskError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = Some("short".to_string());
        assert!(matches!(
            settings.auth.token_issuer(),
            Err(TicketDeskError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_debug_hides_secret() {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = Some("x".repeat(40));
        assert!(!format!("{settings:?}").contains(&"x".repeat(40)));
    }

    #[test]
    fn test_file_storage_selected_by_path() {
        let temp_dir = TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.storage.path = Some(temp_dir.path().join("tickets.yaml"));

        let service = settings
            .ticket_service(Arc::new(StaticDirectory::default()))
            .unwrap();
        service
            .create_ticket(
                &crate::auth::Principal::customer("alice"),
                crate::service::NewTicket::new("s", "d"),
            )
            .unwrap();
        assert!(temp_dir.path().join("tickets.yaml").exists());
    }
}
