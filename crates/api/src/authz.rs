//! API-side access checks.
//!
//! Routes call [`require`] before touching a repository; a denial becomes a
//! 403 response and the repository is never invoked.

use axum::http::StatusCode;
use axum::response::Response;

use hireboard_auth::{AuthzError, Claims, Guard, RequestContext, authenticated, authorize};

use crate::app::errors;
use crate::context::Identity;

pub fn require(chain: &[Guard], identity: &Identity, ctx: &RequestContext<'_>) -> Result<(), Response> {
    authorize(chain, identity.claims(), ctx).map_err(denied)
}

/// Like `require(&[Guard::AuthenticatedOnly], ..)`, but yields the claims.
pub fn require_authenticated(identity: &Identity) -> Result<&Claims, Response> {
    authenticated(identity.claims()).map_err(denied)
}

fn denied(err: AuthzError) -> Response {
    tracing::debug!(error = %err, "request denied");
    errors::json_error(StatusCode::FORBIDDEN, "unauthorized", err.to_string())
}
