//! `oxbank-store` — the transactional services of the banking core.
//!
//! Every public operation here is one atomic unit of work against Postgres:
//! begin, assume the effective storage identity decided by the authorization
//! gate (`SET LOCAL ROLE`), run the row-locked reads and writes, append the
//! paired audit entry under the elevated audit identity, commit. Any failure
//! rolls the whole unit back: no partial state, no partial audit trail.

pub mod audit;
pub mod customers;
pub mod error;
pub mod registry;
pub mod session;
pub mod transactions;


pub use audit::AuditLog;
pub use customers::CustomerDirectory;
pub use error::{ServiceError, ServiceResult};
pub use registry::PgRoleRegistry;
pub use transactions::TransactionEngine;

use sqlx::PgPool;

/// Apply the embedded schema migrations (tables, storage roles, grants).
pub async fn run_migrations(pool: &PgPool) -> ServiceResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| ServiceError::Storage(e.into()))
}
