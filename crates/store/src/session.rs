//! Unit-of-work setup: one transaction per operation, running under the
//! effective storage identity named by the gate's [`Grant`].
//!
//! `SET LOCAL ROLE` scopes the identity to the open transaction, so the
//! store's own grants are the permission check for every statement that
//! follows; commit or rollback restores the connection for the pool.

use sqlx::{PgPool, Postgres, Transaction};

use oxbank_auth::Grant;

use crate::error::{ServiceResult, map_sqlx_error};

/// How long a unit of work waits on a row lock before the store aborts it
/// with a retryable error.
const LOCK_TIMEOUT: &str = "5s";

/// Begin a unit of work under the grant's effective storage identity.
pub(crate) async fn begin_unit_of_work(
    pool: &PgPool,
    grant: &Grant,
) -> ServiceResult<Transaction<'static, Postgres>> {
    let mut tx = pool.begin().await.map_err(|e| map_sqlx_error("begin", e))?;

    sqlx::query(&format!("SET LOCAL lock_timeout = '{LOCK_TIMEOUT}'"))
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("set_lock_timeout", e))?;

    assume_identity(&mut tx, grant.storage_identity()).await?;
    Ok(tx)
}

/// Switch the open transaction to `role`.
///
/// Role names come from the closed role catalogue, never from callers.
pub(crate) async fn assume_identity(
    tx: &mut Transaction<'static, Postgres>,
    role: &str,
) -> ServiceResult<()> {
    sqlx::query(&format!("SET LOCAL ROLE {role}"))
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("set_role", e))?;
    Ok(())
}
