//! Command handlers
//!
//! Each handler takes resolved [`Settings`](crate::config::Settings) and an
//! [`OutputFormatter`](crate::cli::OutputFormatter) and reports through the
//! formatter only.

mod password;
#[cfg(feature = "api")]
mod serve;
mod token;

pub use password::handle_hash_password;
#[cfg(feature = "api")]
pub use serve::handle_serve;
pub use token::handle_token;
