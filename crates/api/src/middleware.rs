use std::sync::Arc;

use axum::{
    extract::State,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use hireboard_auth::{CredentialVerifier, resolve_identity};

use crate::context::Identity;

#[derive(Clone)]
pub struct IdentityState {
    pub verifier: Arc<dyn CredentialVerifier>,
}

/// Attach the caller's identity to the request.
///
/// Never rejects: a missing or unusable credential yields an anonymous
/// identity, and the route's guards decide.
pub async fn identity_middleware(
    State(state): State<IdentityState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let claims = resolve_identity(
        state.verifier.as_ref(),
        req.headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok()),
    );

    req.extensions_mut().insert(Identity::new(claims));

    next.run(req).await
}
