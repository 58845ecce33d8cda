//! Best-effort identity resolution.
//!
//! A missing or unusable credential is never an error here: it resolves to
//! "no identity", and the guards in [`crate::authorize`] decide whether the
//! route can proceed without one.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use thiserror::Error;

use crate::claims::{Claims, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("token rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies a raw token and produces its claims.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims, VerificationError>;
}

/// HMAC-SHA256 signed JWT verifier.
pub struct Hs256Verifier {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256Verifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens may omit `exp`; when present it is still enforced.
        validation.set_required_spec_claims::<&str>(&[]);
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl core::fmt::Debug for Hs256Verifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Verifier").finish_non_exhaustive()
    }
}

impl CredentialVerifier for Hs256Verifier {
    fn verify(&self, token: &str) -> Result<Claims, VerificationError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| VerificationError::Rejected(e.to_string()))?;
        validate_claims(&data.claims, Utc::now())?;
        Ok(data.claims)
    }
}

/// Extract the token from an `Authorization` header value.
///
/// Accepts `Bearer <token>` and `bearer <token>`; anything else is `None`.
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))?
        .trim();
    Some(token).filter(|t| !t.is_empty())
}

/// Resolve the caller's claims from an optional `Authorization` header.
pub fn resolve_identity(verifier: &dyn CredentialVerifier, authorization: Option<&str>) -> Option<Claims> {
    let token = bearer_token(authorization?)?;
    match verifier.verify(token) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unusable credential");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &[u8] = b"test-secret";

    fn mint(claims: &Claims, secret: &[u8]) -> String {
        encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret)).unwrap()
    }

    fn verifier() -> Hs256Verifier {
        Hs256Verifier::new(SECRET)
    }

    #[test]
    fn valid_token_resolves_to_claims() {
        let token = mint(&Claims::new("u1", true), SECRET);
        let header = format!("Bearer {token}");

        let claims = resolve_identity(&verifier(), Some(&header)).unwrap();

        assert_eq!(claims.username, "u1");
        assert!(claims.is_admin);
    }

    #[test]
    fn lowercase_scheme_is_accepted() {
        let token = mint(&Claims::new("u1", false), SECRET);
        let header = format!("bearer {token}");
        assert!(resolve_identity(&verifier(), Some(&header)).is_some());
    }

    #[test]
    fn missing_header_is_no_identity() {
        assert_eq!(resolve_identity(&verifier(), None), None);
    }

    #[test]
    fn wrong_signature_is_no_identity() {
        let token = mint(&Claims::new("u1", true), b"other-secret");
        let header = format!("Bearer {token}");
        assert_eq!(resolve_identity(&verifier(), Some(&header)), None);
    }

    #[test]
    fn malformed_token_is_no_identity() {
        assert_eq!(resolve_identity(&verifier(), Some("Bearer not.a.jwt")), None);
        assert_eq!(resolve_identity(&verifier(), Some("Bearer ")), None);
        assert_eq!(resolve_identity(&verifier(), Some("Basic dTE6cHc=")), None);
    }

    #[test]
    fn expired_token_is_no_identity() {
        let now = Utc::now();
        let mut claims = Claims::new("u1", true);
        claims.iat = Some((now - Duration::hours(2)).timestamp());
        claims.exp = Some((now - Duration::hours(1)).timestamp());
        let header = format!("Bearer {}", mint(&claims, SECRET));

        assert_eq!(resolve_identity(&verifier(), Some(&header)), None);
    }

    #[test]
    fn bearer_token_trims_whitespace() {
        assert_eq!(bearer_token("Bearer   abc  "), Some("abc"));
        assert_eq!(bearer_token("Token abc"), None);
    }
}
