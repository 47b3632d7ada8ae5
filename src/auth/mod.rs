//! Credentials and principals
//!
//! Login exchanges a username and password for a short-lived signed token
//! that binds an identity to a [`Role`]. Every authenticated request
//! presents that token and is turned back into a [`Principal`].

mod authenticator;
mod directory;
pub mod password;
mod principal;
mod token;

pub use authenticator::{AccessToken, Authenticator};
pub use directory::{DirectoryEntry, StaticDirectory, UserDirectory};
pub use principal::{Principal, Role};
pub use token::{Claims, TokenIssuer};

#[cfg(test)]
pub use directory::MockUserDirectory;
