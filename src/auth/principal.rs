use crate::error::{Result, TicketDeskError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role carried by every credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Agent,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Agent => "agent",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TicketDeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "agent" => Ok(Self::Agent),
            "admin" => Ok(Self::Admin),
            _ => Err(TicketDeskError::InvalidInput(format!(
                "Invalid role: {s}. Must be one of: customer, agent, admin"
            ))),
        }
    }
}

/// Authenticated identity and role derived from a verified credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub identity: String,
    pub role: Role,
}

impl Principal {
    pub fn new(identity: impl Into<String>, role: Role) -> Self {
        Self {
            identity: identity.into(),
            role,
        }
    }

    pub fn customer(identity: impl Into<String>) -> Self {
        Self::new(identity, Role::Customer)
    }

    pub fn agent(identity: impl Into<String>) -> Self {
        Self::new(identity, Role::Agent)
    }

    pub fn admin(identity: impl Into<String>) -> Self {
        Self::new(identity, Role::Admin)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.identity, self.role)
    }
}
