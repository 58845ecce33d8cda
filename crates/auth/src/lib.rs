//! `hireboard-auth`: identity resolution and authorization decisions.
//!
//! This crate is intentionally decoupled from HTTP and storage: guards are
//! pure functions of an optional claims value.

pub mod authorize;
pub mod claims;
pub mod identity;

pub use authorize::{AuthzError, Guard, RequestContext, authenticated, authorize};
pub use claims::{Claims, TokenValidationError, validate_claims};
pub use identity::{CredentialVerifier, Hs256Verifier, VerificationError, bearer_token, resolve_identity};
