use oxbank_auth::Principal;

/// Principal context for a request (authenticated identity).
///
/// Roles are deliberately not part of the context: every operation queries
/// membership freshly through the role registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}
