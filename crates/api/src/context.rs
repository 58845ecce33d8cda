use hireboard_auth::Claims;

/// Resolved caller identity for a request.
///
/// Inserted by the identity middleware on every request; `None` claims mean
/// an anonymous caller. Guards decide what that is allowed to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity(Option<Claims>);

impl Identity {
    pub fn new(claims: Option<Claims>) -> Self {
        Self(claims)
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.0.as_ref()
    }
}
