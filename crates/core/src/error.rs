//! Domain error model.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation,
/// invariants, missing entities). Authorization and infrastructure concerns
/// belong to their own layers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. non-positive amount, empty name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested entity id does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The transaction either does not exist or is not pending approval.
    ///
    /// Deliberately coarse: the approval path cannot distinguish the two
    /// cases, and callers observe a single error kind.
    #[error("transaction not found or not pending approval")]
    NotFoundOrNotPending,

    /// A withdrawal would overdraw the account at apply time.
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound(entity)
    }

    pub fn insufficient_funds(requested: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds {
            requested,
            available,
        }
    }
}
