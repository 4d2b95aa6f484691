//! Audit trail service.
//!
//! The trail runs under the fixed `oxbank_audit` storage identity regardless
//! of caller: the table carries no grants for the teller/manager/auditor
//! roles, so elevated execution is the only way in or out. The gate still
//! requires the caller to hold the outer capability (`audit.write` for all
//! three roles, `audit.read` for AUDITOR and MANAGER).
//!
//! Trust boundary: callers self-report old/new value images; the service
//! appends them verbatim and never cross-checks them against the named
//! entity.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};
use sqlx::postgres::PgRow;
use std::sync::Arc;
use tracing::instrument;

use oxbank_audit::{
    AuditAction, AuditEntry, AuditEvent, AuditPage, AuditQuery, AuditedEntity, Pagination,
};
use oxbank_auth::{ELEVATED_STORAGE_ROLE, Operation, Principal, RoleRegistry, authorize};
use oxbank_core::AuditEntryId;

use crate::error::{ServiceError, ServiceResult, map_sqlx_error};
use crate::session;

/// The audit service: exclusive writer and reader of the audit trail.
#[derive(Clone)]
pub struct AuditLog {
    pool: PgPool,
    registry: Arc<dyn RoleRegistry>,
}

impl AuditLog {
    pub fn new(pool: PgPool, registry: Arc<dyn RoleRegistry>) -> Self {
        Self { pool, registry }
    }

    /// Record one audit event in its own unit of work.
    ///
    /// Used for caller-originated events; the state-changing services append
    /// their paired entries inside their own transactions instead.
    #[instrument(skip(self, event), fields(principal = %principal, action = ?event.action), err)]
    pub async fn record(
        &self,
        principal: &Principal,
        event: AuditEvent,
    ) -> ServiceResult<AuditEntry> {
        let grant = authorize(self.registry.as_ref(), principal, Operation::RecordAuditEvent)
            .await?;

        let mut tx = session::begin_unit_of_work(&self.pool, &grant).await?;
        let entry = append_in_tx(&mut tx, &event).await?;
        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(entry)
    }

    /// Query the trail, newest first.
    ///
    /// The range end defaults to "now at execution"; results are finite and
    /// restartable via limit/offset pagination.
    #[instrument(skip(self, query, page), fields(principal = %principal), err)]
    pub async fn query(
        &self,
        principal: &Principal,
        query: AuditQuery,
        page: Pagination,
    ) -> ServiceResult<AuditPage> {
        let grant = authorize(self.registry.as_ref(), principal, Operation::QueryAuditLog).await?;

        let end = query.effective_end(Utc::now());
        let mut tx = session::begin_unit_of_work(&self.pool, &grant).await?;

        // Fetch one row past the page to learn whether more exist.
        let rows = sqlx::query(
            r#"
            SELECT id, principal, action, entity, entity_id,
                   old_value, new_value, origin, recorded_at
            FROM audit_logs
            WHERE recorded_at >= $1
              AND recorded_at <= $2
              AND ($3::text IS NULL OR principal = $3)
            ORDER BY recorded_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(query.start)
        .bind(end)
        .bind(query.principal.as_deref())
        .bind(i64::from(page.limit) + 1)
        .bind(i64::from(page.offset))
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("query_audit_log", e))?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;

        let has_more = rows.len() as i64 > i64::from(page.limit);
        let entries = rows
            .into_iter()
            .take(page.limit as usize)
            .map(|row| entry_from_row(&row))
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(AuditPage {
            entries,
            pagination: page,
            has_more,
        })
    }
}

/// Append one audit row inside an already-open unit of work.
///
/// Switches the transaction to the elevated audit identity first; callers
/// commit afterwards, so a failed append rolls back the whole operation it
/// was paired with.
pub(crate) async fn append_in_tx(
    tx: &mut Transaction<'static, Postgres>,
    event: &AuditEvent,
) -> ServiceResult<AuditEntry> {
    session::assume_identity(tx, ELEVATED_STORAGE_ROLE).await?;

    let row = sqlx::query(
        r#"
        INSERT INTO audit_logs
            (principal, action, entity, entity_id, old_value, new_value, origin)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, recorded_at
        "#,
    )
    .bind(&event.principal)
    .bind(event.action.as_str())
    .bind(event.entity.as_str())
    .bind(event.entity_id)
    .bind(event.old_value.as_deref())
    .bind(event.new_value.as_deref())
    .bind(event.origin.as_deref())
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("append_audit", e))?;

    let id: i64 = row.try_get("id").map_err(decode)?;
    let recorded_at: DateTime<Utc> = row.try_get("recorded_at").map_err(decode)?;

    Ok(AuditEntry {
        id: AuditEntryId::from_raw(id),
        principal: event.principal.clone(),
        action: event.action,
        entity: event.entity,
        entity_id: event.entity_id,
        old_value: event.old_value.clone(),
        new_value: event.new_value.clone(),
        origin: event.origin.clone(),
        recorded_at,
    })
}

fn entry_from_row(row: &PgRow) -> ServiceResult<AuditEntry> {
    let action: String = row.try_get("action").map_err(decode)?;
    let entity: String = row.try_get("entity").map_err(decode)?;

    Ok(AuditEntry {
        id: AuditEntryId::from_raw(row.try_get("id").map_err(decode)?),
        principal: row.try_get("principal").map_err(decode)?,
        action: parse_action(&action)?,
        entity: parse_entity(&entity)?,
        entity_id: row.try_get("entity_id").map_err(decode)?,
        old_value: row.try_get("old_value").map_err(decode)?,
        new_value: row.try_get("new_value").map_err(decode)?,
        origin: row.try_get("origin").map_err(decode)?,
        recorded_at: row.try_get("recorded_at").map_err(decode)?,
    })
}

fn parse_action(s: &str) -> ServiceResult<AuditAction> {
    match s {
        "CREATE" => Ok(AuditAction::Create),
        "UPDATE" => Ok(AuditAction::Update),
        "VIEW" => Ok(AuditAction::View),
        "APPROVE" => Ok(AuditAction::Approve),
        other => Err(ServiceError::Decode(format!("unknown audit action '{other}'"))),
    }
}

fn parse_entity(s: &str) -> ServiceResult<AuditedEntity> {
    match s {
        "customers" => Ok(AuditedEntity::Customers),
        "accounts" => Ok(AuditedEntity::Accounts),
        "transactions" => Ok(AuditedEntity::Transactions),
        other => Err(ServiceError::Decode(format!("unknown audit entity '{other}'"))),
    }
}

fn decode(e: sqlx::Error) -> ServiceError {
    ServiceError::Decode(e.to_string())
}
