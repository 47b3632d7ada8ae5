use super::{Principal, Role};
use crate::error::{Result, TicketDeskError};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const MIN_SECRET_LEN: usize = 32;

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity of the principal
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies HS256 access tokens
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create an issuer from a shared secret of at least 32 bytes
    pub fn new(secret: &[u8]) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(TicketDeskError::InvalidInput(format!(
                "JWT secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        Ok(Self::from_secret(secret))
    }

    /// Create an issuer with a random secret; tokens die with the process
    #[must_use]
    pub fn with_random_secret() -> Self {
        let secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        Self::from_secret(secret.as_bytes())
    }

    fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the caller's clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a token for `principal` valid for `ttl` from now
    pub fn issue(&self, principal: &Principal, ttl: Duration) -> Result<String> {
        self.issue_at(principal, ttl, Utc::now())
    }

    pub fn issue_at(&self, principal: &Principal, ttl: Duration, now: DateTime<Utc>) -> Result<String> {
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            TicketDeskError::InvalidInput(format!("Token lifetime out of range: {ttl}"))
        })?;
        let claims = Claims {
            sub: principal.identity.clone(),
            role: principal.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TicketDeskError::custom(format!("Failed to sign token: {e}")))
    }

    /// Verify signature and expiry and return the bound principal
    pub fn verify(&self, token: &str) -> Result<Principal> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Principal> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TicketDeskError::Unauthenticated(format!("Invalid token: {e}")))?
            .claims;

        if now.timestamp() >= claims.exp {
            return Err(TicketDeskError::Unauthenticated(
                "Token expired".to_string(),
            ));
        }

        Ok(Principal::new(claims.sub, claims.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_issue_then_verify() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let principal = Principal::agent("bob");

        let token = issuer.issue(&principal, Duration::minutes(30)).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), principal);
    }

    #[test]
    fn test_expired_token() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let now = Utc::now();
        let token = issuer
            .issue_at(&Principal::customer("alice"), Duration::minutes(30), now)
            .unwrap();

        assert!(issuer.verify_at(&token, now + Duration::minutes(29)).is_ok());
        let err = issuer
            .verify_at(&token, now + Duration::minutes(30))
            .unwrap_err();
        assert!(matches!(err, TicketDeskError::Unauthenticated(_)));
    }

    #[test]
    fn test_zero_ttl_is_never_valid() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let now = Utc::now();
        let token = issuer
            .issue_at(&Principal::admin("root"), Duration::zero(), now)
            .unwrap();
        assert!(issuer.verify_at(&token, now).is_err());
    }

    #[test]
    fn test_out_of_range_ttl_is_an_error() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let result = issuer.issue(&Principal::agent("bob"), Duration::days(1_000_000_000));
        assert!(matches!(result, Err(TicketDeskError::InvalidInput(_))));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let other = TokenIssuer::new(b"ffffffffffffffffffffffffffffffff").unwrap();
        let token = other
            .issue(&Principal::admin("root"), Duration::minutes(5))
            .unwrap();

        assert!(matches!(
            issuer.verify(&token),
            Err(TicketDeskError::Unauthenticated(_))
        ));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        assert!(matches!(
            issuer.verify("not.a.jwt"),
            Err(TicketDeskError::Unauthenticated(_))
        ));
        assert!(issuer.verify("").is_err());
    }

    #[test]
    fn test_tampered_role_rejected() {
        let issuer = TokenIssuer::new(SECRET).unwrap();
        let token = issuer
            .issue(&Principal::customer("alice"), Duration::minutes(5))
            .unwrap();

        let forged = issuer
            .issue(&Principal::admin("alice"), Duration::minutes(5))
            .unwrap();
        // Splice the admin payload onto the customer signature.
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(issuer.verify(&spliced).is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(TokenIssuer::new(b"short").is_err());
    }

    #[test]
    fn test_random_secret_round_trip() {
        let issuer = TokenIssuer::with_random_secret();
        let token = issuer
            .issue(&Principal::customer("alice"), Duration::minutes(1))
            .unwrap();
        assert_eq!(issuer.verify(&token).unwrap().identity, "alice");
    }
}
