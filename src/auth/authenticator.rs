use super::{Principal, Role, TokenIssuer, UserDirectory};
use crate::error::{Result, TicketDeskError};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Response of a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Login and token verification on top of a [`UserDirectory`]
pub struct Authenticator {
    directory: Arc<dyn UserDirectory>,
    issuer: TokenIssuer,
    ttl: Duration,
}

impl Authenticator {
    pub fn new(directory: Arc<dyn UserDirectory>, issuer: TokenIssuer, ttl: Duration) -> Self {
        Self {
            directory,
            issuer,
            ttl,
        }
    }

    /// Exchange a username and password for an access token
    pub fn login(&self, username: &str, password: &str) -> Result<AccessToken> {
        let principal = self.directory.authenticate(username, password)?;
        let access_token = self.issuer.issue(&principal, self.ttl)?;
        info!("Issued token for {principal}");

        Ok(AccessToken {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.ttl.num_seconds(),
        })
    }

    /// Issue a token for a principal the directory knows with this role
    pub fn issue(&self, identity: &str, role: Role, ttl: Duration) -> Result<String> {
        match self.directory.role_of(identity) {
            Some(known) if known == role => {},
            _ => {
                warn!("Refusing to issue a {role} token for '{identity}'");
                return Err(TicketDeskError::InvalidPrincipal);
            },
        }
        self.issuer.issue(&Principal::new(identity, role), ttl)
    }

    /// Decode a bearer token into the principal it binds
    pub fn verify(&self, token: &str) -> Result<Principal> {
        let principal = self.issuer.verify(token).inspect_err(|e| {
            debug!("Rejected token: {e}");
        })?;
        Ok(principal)
    }

    /// Default token lifetime
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}
