use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Capability identifier.
///
/// Capabilities are modeled as opaque strings (e.g. "transactions.approve"):
/// one permission to perform one class of operation on one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(Cow<'static, str>);

impl Capability {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const CUSTOMERS_CREATE: &str = "customers.create";
pub const CUSTOMERS_READ: &str = "customers.read";
pub const CUSTOMERS_UPDATE: &str = "customers.update";
pub const TRANSACTIONS_CREATE: &str = "transactions.create";
pub const TRANSACTIONS_READ: &str = "transactions.read";
pub const TRANSACTIONS_APPROVE: &str = "transactions.approve";
pub const AUDIT_WRITE: &str = "audit.write";
pub const AUDIT_READ: &str = "audit.read";

/// The capability set a role grants (pure policy, no IO).
///
/// Tellers originate customer records and transactions; managers additionally
/// amend customers and approve held transactions; auditors read everything
/// and nothing else. Every role may write audit events.
pub fn capabilities_for(role: Role) -> &'static [&'static str] {
    match role {
        Role::Teller => &[
            CUSTOMERS_CREATE,
            CUSTOMERS_READ,
            TRANSACTIONS_CREATE,
            TRANSACTIONS_READ,
            AUDIT_WRITE,
        ],
        Role::Manager => &[
            CUSTOMERS_CREATE,
            CUSTOMERS_READ,
            CUSTOMERS_UPDATE,
            TRANSACTIONS_CREATE,
            TRANSACTIONS_READ,
            TRANSACTIONS_APPROVE,
            AUDIT_WRITE,
            AUDIT_READ,
        ],
        Role::Auditor => &[CUSTOMERS_READ, TRANSACTIONS_READ, AUDIT_WRITE, AUDIT_READ],
    }
}

/// Roles whose grant includes `capability`, in gate probing order.
pub fn roles_granting(capability: &str) -> impl Iterator<Item = Role> + '_ {
    Role::ALL
        .into_iter()
        .filter(move |role| capabilities_for(*role).contains(&capability))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approve_is_manager_only() {
        let roles: Vec<Role> = roles_granting(TRANSACTIONS_APPROVE).collect();
        assert_eq!(roles, vec![Role::Manager]);
    }

    #[test]
    fn customer_update_is_manager_only() {
        let roles: Vec<Role> = roles_granting(CUSTOMERS_UPDATE).collect();
        assert_eq!(roles, vec![Role::Manager]);
    }

    #[test]
    fn every_role_may_write_audit_events() {
        let roles: Vec<Role> = roles_granting(AUDIT_WRITE).collect();
        assert_eq!(roles, vec![Role::Teller, Role::Manager, Role::Auditor]);
    }

    #[test]
    fn audit_read_excludes_tellers() {
        let roles: Vec<Role> = roles_granting(AUDIT_READ).collect();
        assert_eq!(roles, vec![Role::Manager, Role::Auditor]);
    }
}
