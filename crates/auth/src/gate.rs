//! The authorization gate.
//!
//! Every public operation passes through `authorize` before any storage
//! statement is staged. The gate answers two questions: may this principal
//! invoke the operation at all (capability check against freshly queried
//! role membership), and *whose* privilege set the unit of work then runs
//! under (the caller's role for ordinary operations, the fixed audit service
//! identity for audit trail access).

use thiserror::Error;

use crate::capability::{self, Capability, roles_granting};
use crate::registry::RoleRegistry;
use crate::{Principal, Role};

/// Storage identity the audit trail is written and read with, regardless of
/// which principal invoked the operation.
pub const ELEVATED_STORAGE_ROLE: &str = "oxbank_audit";

/// Whose privilege set the storage statements of an operation run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Statements execute with the caller's granted role; the store's own
    /// access rules are the permission check.
    AsCaller,
    /// Statements execute under [`ELEVATED_STORAGE_ROLE`]. The gate still
    /// requires the caller to hold the outer execute capability.
    AsService,
}

/// The eight public operations of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateCustomer,
    GetCustomerDetails,
    UpdateCustomer,
    CreateTransaction,
    ApproveTransaction,
    GetTransactionDetails,
    RecordAuditEvent,
    QueryAuditLog,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateCustomer => "create_customer",
            Operation::GetCustomerDetails => "get_customer_details",
            Operation::UpdateCustomer => "update_customer",
            Operation::CreateTransaction => "create_transaction",
            Operation::ApproveTransaction => "approve_transaction",
            Operation::GetTransactionDetails => "get_transaction_details",
            Operation::RecordAuditEvent => "record_audit_event",
            Operation::QueryAuditLog => "query_audit_log",
        }
    }

    /// The capability a caller must hold to invoke this operation.
    pub fn required_capability(&self) -> Capability {
        Capability::new(match self {
            Operation::CreateCustomer => capability::CUSTOMERS_CREATE,
            Operation::GetCustomerDetails => capability::CUSTOMERS_READ,
            Operation::UpdateCustomer => capability::CUSTOMERS_UPDATE,
            Operation::CreateTransaction => capability::TRANSACTIONS_CREATE,
            Operation::ApproveTransaction => capability::TRANSACTIONS_APPROVE,
            Operation::GetTransactionDetails => capability::TRANSACTIONS_READ,
            Operation::RecordAuditEvent => capability::AUDIT_WRITE,
            Operation::QueryAuditLog => capability::AUDIT_READ,
        })
    }

    /// Audit trail access runs as the service identity; everything else runs
    /// with the caller's own privileges.
    pub fn execution_mode(&self) -> ExecutionMode {
        match self {
            Operation::RecordAuditEvent | Operation::QueryAuditLog => ExecutionMode::AsService,
            _ => ExecutionMode::AsCaller,
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A positive authorization decision.
///
/// Carries everything the storage layer needs to make the effective identity
/// of the unit of work explicit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub principal: Principal,
    /// The role that satisfied the capability check.
    pub via_role: Role,
    pub operation: Operation,
}

impl Grant {
    pub fn execution_mode(&self) -> ExecutionMode {
        self.operation.execution_mode()
    }

    /// The storage role the unit of work assumes.
    pub fn storage_identity(&self) -> &'static str {
        match self.execution_mode() {
            ExecutionMode::AsCaller => self.via_role.storage_role(),
            ExecutionMode::AsService => ELEVATED_STORAGE_ROLE,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The principal holds no role granting the required capability.
    #[error("denied: principal '{principal}' lacks capability '{capability}'")]
    Denied {
        principal: String,
        capability: String,
    },

    /// The store's own access layer refused a statement. Surfaced as an
    /// authorization error, never downgraded to a no-op.
    #[error("denied by storage access layer: {0}")]
    StorageDenied(String),

    /// The role registry could not be consulted.
    #[error("role registry failure: {0}")]
    Registry(String),
}

/// Authorize `principal` to invoke `operation`.
///
/// Membership is queried freshly on every call (no caching), so revocations
/// take effect on the next operation. Returns the [`Grant`] naming the role
/// that satisfied the check, or a distinguishable denial.
pub async fn authorize(
    registry: &dyn RoleRegistry,
    principal: &Principal,
    operation: Operation,
) -> Result<Grant, AuthzError> {
    let capability = operation.required_capability();

    for role in roles_granting(capability.as_str()) {
        let held = registry
            .has_role(principal, role)
            .await
            .map_err(|e| AuthzError::Registry(e.to_string()))?;
        if held {
            return Ok(Grant {
                principal: principal.clone(),
                via_role: role,
                operation,
            });
        }
    }

    tracing::warn!(
        principal = %principal,
        operation = %operation,
        capability = %capability,
        "authorization denied"
    );

    Err(AuthzError::Denied {
        principal: principal.as_str().to_string(),
        capability: capability.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::registry::{InMemoryRoleRegistry, RegistryError};

    fn principal(name: &str) -> Principal {
        Principal::new(name).unwrap()
    }

    #[tokio::test]
    async fn teller_may_create_customers_but_not_approve() {
        let registry = InMemoryRoleRegistry::new();
        let alice = principal("alice");
        registry.grant(&alice, Role::Teller);

        let grant = authorize(&registry, &alice, Operation::CreateCustomer)
            .await
            .unwrap();
        assert_eq!(grant.via_role, Role::Teller);
        assert_eq!(grant.execution_mode(), ExecutionMode::AsCaller);
        assert_eq!(grant.storage_identity(), "oxbank_teller");

        let err = authorize(&registry, &alice, Operation::ApproveTransaction)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::Denied { .. }));
    }

    #[tokio::test]
    async fn audit_operations_run_as_service_identity() {
        let registry = InMemoryRoleRegistry::new();
        let alice = principal("alice");
        registry.grant(&alice, Role::Teller);

        // Any role may write audit events, but the write itself is elevated.
        let grant = authorize(&registry, &alice, Operation::RecordAuditEvent)
            .await
            .unwrap();
        assert_eq!(grant.execution_mode(), ExecutionMode::AsService);
        assert_eq!(grant.storage_identity(), ELEVATED_STORAGE_ROLE);

        // Reading the trail needs AUDITOR or MANAGER.
        let err = authorize(&registry, &alice, Operation::QueryAuditLog)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::Denied { .. }));

        let carol = principal("carol");
        registry.grant(&carol, Role::Auditor);
        let grant = authorize(&registry, &carol, Operation::QueryAuditLog)
            .await
            .unwrap();
        assert_eq!(grant.via_role, Role::Auditor);
        assert_eq!(grant.storage_identity(), ELEVATED_STORAGE_ROLE);
    }

    #[tokio::test]
    async fn manager_grant_names_the_satisfying_role() {
        let registry = InMemoryRoleRegistry::new();
        let bob = principal("bob");
        registry.grant(&bob, Role::Manager);

        let grant = authorize(&registry, &bob, Operation::ApproveTransaction)
            .await
            .unwrap();
        assert_eq!(grant.via_role, Role::Manager);
        assert_eq!(grant.storage_identity(), "oxbank_manager");
    }

    /// Registry that counts lookups, to observe the no-caching contract.
    struct CountingRegistry {
        inner: InMemoryRoleRegistry,
        lookups: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RoleRegistry for CountingRegistry {
        async fn has_role(
            &self,
            principal: &Principal,
            role: Role,
        ) -> Result<bool, RegistryError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.has_role(principal, role).await
        }
    }

    #[tokio::test]
    async fn membership_is_queried_fresh_per_call() {
        let registry = CountingRegistry {
            inner: InMemoryRoleRegistry::new(),
            lookups: AtomicUsize::new(0),
        };
        let bob = principal("bob");
        registry.inner.grant(&bob, Role::Manager);

        authorize(&registry, &bob, Operation::ApproveTransaction)
            .await
            .unwrap();
        let after_first = registry.lookups.load(Ordering::SeqCst);
        assert!(after_first >= 1);

        authorize(&registry, &bob, Operation::ApproveTransaction)
            .await
            .unwrap();
        assert!(registry.lookups.load(Ordering::SeqCst) > after_first);

        // Revocation takes effect on the very next call.
        registry.inner.revoke(&bob, Role::Manager);
        let err = authorize(&registry, &bob, Operation::ApproveTransaction)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::Denied { .. }));
    }
}
