use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token claims (transport-agnostic).
///
/// This is the minimal set of claims expected once a token has been decoded
/// and its signature verified. It lives for one request and is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity name. Empty means "no usable identity".
    #[serde(default)]
    pub username: String,

    /// Admin privilege. Only a JSON `true` grants it; any non-boolean value
    /// fails decoding, which makes the whole token unusable.
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,

    /// Issued-at, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    pub fn new(username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            username: username.into(),
            is_admin,
            iat: None,
            exp: None,
        }
    }

    /// The identity name, if non-empty.
    pub fn identity(&self) -> Option<&str> {
        Some(self.username.as_str()).filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of already-decoded claims.
///
/// Both timestamps are optional; only the ones present are checked.
/// Signature verification happens before this, in the verifier.
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if let (Some(iat), Some(exp)) = (claims.iat, claims.exp) {
        if exp <= iat {
            return Err(TokenValidationError::InvalidTimeWindow);
        }
    }
    if claims.iat.is_some_and(|iat| now < iat) {
        return Err(TokenValidationError::NotYetValid);
    }
    if claims.exp.is_some_and(|exp| now >= exp) {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(now: DateTime<Utc>, offset_secs: i64) -> Option<i64> {
        Some((now + Duration::seconds(offset_secs)).timestamp())
    }

    #[test]
    fn missing_timestamps_are_accepted() {
        assert_eq!(validate_claims(&Claims::new("u1", false), Utc::now()), Ok(()));
    }

    #[test]
    fn time_window_is_checked() {
        let now = Utc::now();
        let mut claims = Claims::new("u1", false);

        claims.iat = at(now, -60);
        claims.exp = at(now, 60);
        assert_eq!(validate_claims(&claims, now), Ok(()));

        claims.exp = at(now, -1);
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::Expired));

        claims.iat = at(now, 30);
        claims.exp = at(now, 90);
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::NotYetValid));

        claims.exp = claims.iat;
        assert_eq!(validate_claims(&claims, now), Err(TokenValidationError::InvalidTimeWindow));
    }

    #[test]
    fn admin_flag_must_be_a_boolean() {
        let parsed: Result<Claims, _> =
            serde_json::from_value(serde_json::json!({"username": "u1", "isAdmin": "true"}));
        assert!(parsed.is_err());

        let parsed: Claims = serde_json::from_value(serde_json::json!({"username": "u1"})).unwrap();
        assert!(!parsed.is_admin);
    }

    #[test]
    fn empty_username_has_no_identity() {
        assert_eq!(Claims::new("", true).identity(), None);
        assert_eq!(Claims::new("u1", false).identity(), Some("u1"));
    }
}
