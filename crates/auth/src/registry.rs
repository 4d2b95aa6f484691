use std::collections::HashSet;
use std::sync::RwLock;

use thiserror::Error;

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("role registry failure: {0}")]
pub struct RegistryError(pub String);

/// Role-membership lookup against the external identity process.
///
/// Implementations must answer freshly on every call: the gate relies on
/// revocations taking effect immediately, so no caching layer belongs here.
#[async_trait::async_trait]
pub trait RoleRegistry: Send + Sync {
    async fn has_role(&self, principal: &Principal, role: Role) -> Result<bool, RegistryError>;
}

/// In-memory registry for tests and local wiring.
#[derive(Debug, Default)]
pub struct InMemoryRoleRegistry {
    grants: RwLock<HashSet<(String, Role)>>,
}

impl InMemoryRoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, principal: &Principal, role: Role) {
        self.grants
            .write()
            .expect("registry lock poisoned")
            .insert((principal.as_str().to_string(), role));
    }

    pub fn revoke(&self, principal: &Principal, role: Role) {
        self.grants
            .write()
            .expect("registry lock poisoned")
            .remove(&(principal.as_str().to_string(), role));
    }
}

#[async_trait::async_trait]
impl RoleRegistry for InMemoryRoleRegistry {
    async fn has_role(&self, principal: &Principal, role: Role) -> Result<bool, RegistryError> {
        Ok(self
            .grants
            .read()
            .expect("registry lock poisoned")
            .contains(&(principal.as_str().to_string(), role)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(name: &str) -> Principal {
        Principal::new(name).unwrap()
    }

    #[tokio::test]
    async fn grant_and_revoke_are_visible_immediately() {
        let registry = InMemoryRoleRegistry::new();
        let alice = principal("alice");

        assert!(!registry.has_role(&alice, Role::Teller).await.unwrap());

        registry.grant(&alice, Role::Teller);
        assert!(registry.has_role(&alice, Role::Teller).await.unwrap());
        assert!(!registry.has_role(&alice, Role::Manager).await.unwrap());

        registry.revoke(&alice, Role::Teller);
        assert!(!registry.has_role(&alice, Role::Teller).await.unwrap());
    }
}
