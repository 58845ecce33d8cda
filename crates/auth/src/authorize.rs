use thiserror::Error;

use crate::claims::Claims;

/// Request-scoped facts a guard may consult besides the claims.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext<'a> {
    /// Identity name taken from the request path (e.g. `/users/:username/...`).
    pub target_username: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(target_username: &'a str) -> Self {
        Self {
            target_username: Some(target_username),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),
}

/// Access checks, evaluated against the request's (optional) claims.
///
/// All guards fail closed: access is granted only by an explicit match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// No identity required.
    Open,
    /// Any caller with a non-empty identity name.
    AuthenticatedOnly,
    /// An identified caller whose admin flag is `true`.
    AdminOnly,
    /// An admin, or the identity named by the request path.
    AdminOrResourceOwner,
}

impl Guard {
    /// Decide whether `claims` may proceed.
    ///
    /// - No IO
    /// - No panics
    /// - Identity presence is checked before privilege
    pub fn check(self, claims: Option<&Claims>, ctx: &RequestContext<'_>) -> Result<(), AuthzError> {
        match self {
            Guard::Open => Ok(()),
            Guard::AuthenticatedOnly => authenticated(claims).map(|_| ()),
            Guard::AdminOnly => {
                let (_, claims) = identity(claims)?;
                if claims.is_admin {
                    Ok(())
                } else {
                    Err(AuthzError::Unauthorized("admin privileges required"))
                }
            }
            Guard::AdminOrResourceOwner => {
                let is_admin = claims.is_some_and(|c| c.is_admin);
                let is_owner = match (claims.and_then(Claims::identity), ctx.target_username) {
                    (Some(current), Some(target)) => current == target,
                    _ => false,
                };
                if is_admin || is_owner {
                    Ok(())
                } else {
                    Err(AuthzError::Unauthorized("admin or resource owner required"))
                }
            }
        }
    }
}

/// Evaluate a guard chain in order; the first denial wins.
///
/// An empty chain grants nothing.
pub fn authorize(chain: &[Guard], claims: Option<&Claims>, ctx: &RequestContext<'_>) -> Result<(), AuthzError> {
    if chain.is_empty() {
        return Err(AuthzError::Unauthorized("no access rule matched"));
    }
    for guard in chain {
        guard.check(claims, ctx)?;
    }
    Ok(())
}

/// The claims of an identified caller; the `AuthenticatedOnly` check as a
/// value-returning function.
pub fn authenticated(claims: Option<&Claims>) -> Result<&Claims, AuthzError> {
    identity(claims).map(|(_, claims)| claims)
}

fn identity(claims: Option<&Claims>) -> Result<(&str, &Claims), AuthzError> {
    let claims = claims.ok_or(AuthzError::Unauthorized("authentication required"))?;
    let name = claims
        .identity()
        .ok_or(AuthzError::Unauthorized("authentication required"))?;
    Ok((name, claims))
}
