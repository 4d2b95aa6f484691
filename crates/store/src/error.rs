//! Service error model and sqlx error mapping.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `ServiceError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | ServiceError | Scenario |
//! |------------|----------------------|--------------|----------|
//! | Database (lock not available) | `55P03` | `ConflictOrTimeout` | Row lock wait exceeded `lock_timeout` |
//! | Database (serialization failure) | `40001` | `ConflictOrTimeout` | Concurrent unit of work won the race |
//! | Database (deadlock detected) | `40P01` | `ConflictOrTimeout` | Lock ordering violated under contention |
//! | Database (insufficient privilege) | `42501` | `Authz(StorageDenied)` | The assumed storage role lacks the grant |
//! | Database (other) | Any other | `Storage` | Constraint violations, connection faults |
//! | Other | N/A | `Storage` | Pool/network failures |
//!
//! `ConflictOrTimeout` is the only retryable kind; everything else is final
//! for the issued operation.

use thiserror::Error;

use oxbank_auth::AuthzError;
use oxbank_core::DomainError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a unit of work.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Deterministic business-rule failure (validation, missing entity,
    /// insufficient funds, not-pending).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Authorization failure, from the gate or from the store's own access
    /// layer.
    #[error(transparent)]
    Authz(#[from] AuthzError),

    /// Lock contention or timeout; the unit of work rolled back and may be
    /// retried.
    #[error("conflict or lock timeout: {0}")]
    ConflictOrTimeout(String),

    /// A persisted row could not be decoded into its domain type.
    #[error("failed to decode row: {0}")]
    Decode(String),

    /// Any other storage failure.
    #[error("storage error: {0}")]
    Storage(#[source] sqlx::Error),
}

/// Map a sqlx error raised by `operation` into the service taxonomy.
pub(crate) fn map_sqlx_error(operation: &'static str, e: sqlx::Error) -> ServiceError {
    if let sqlx::Error::Database(db) = &e {
        match db.code().as_deref() {
            Some("55P03") | Some("40001") | Some("40P01") => {
                return ServiceError::ConflictOrTimeout(format!("{operation}: {}", db.message()));
            }
            Some("42501") => {
                return ServiceError::Authz(AuthzError::StorageDenied(format!(
                    "{operation}: {}",
                    db.message()
                )));
            }
            _ => {}
        }
    }
    ServiceError::Storage(e)
}
