//! Argon2id password hashing for directory entries

use crate::error::{Result, TicketDeskError};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use tracing::warn;

/// Hash a password with the default Argon2id parameters
pub fn hash_password(password: &str) -> Result<String> {
    hash_with(&Argon2::default(), password)
}

/// Hash a password with explicit cost parameters
///
/// `memory_kib`, `iterations` and `parallelism` are embedded in the
/// resulting PHC string, so verification needs no extra configuration.
pub fn hash_password_with_cost(
    password: &str,
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
) -> Result<String> {
    let params = Params::new(memory_kib, iterations, parallelism, None)
        .map_err(|e| TicketDeskError::InvalidInput(format!("Invalid Argon2 parameters: {e}")))?;
    hash_with(&Argon2::new(Algorithm::Argon2id, Version::V0x13, params), password)
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| TicketDeskError::custom(format!("Password hashing failed: {e}")))
}

/// Reject strings that are not PHC-formatted hashes
pub fn validate_hash(hash: &str) -> Result<()> {
    PasswordHash::new(hash)
        .map(|_| ())
        .map_err(|e| TicketDeskError::InvalidInput(format!("Malformed password hash: {e}")))
}

/// Check a password against a PHC hash string
///
/// A mismatch is `Ok(false)`; only a malformed hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| TicketDeskError::InvalidInput(format!("Malformed password hash: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => {
            warn!("Password verification failed: {e}");
            Err(TicketDeskError::custom(format!(
                "Password verification failed: {e}"
            )))
        },
    }
}
