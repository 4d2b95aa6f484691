//! Customer Directory service.
//!
//! All three operations run with the caller's own privileges; the store's
//! grants make them enforceable (tellers hold no UPDATE grant on customers,
//! so `update_customer` is manager-only twice over). Reads are audited too:
//! the VIEW entry is appended inside the same unit of work, so a failed
//! audit write rolls the read back and the trail stays complete.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::instrument;

use oxbank_audit::{AuditAction, AuditEvent, AuditedEntity};
use oxbank_auth::{Operation, Principal, RoleRegistry, authorize};
use oxbank_core::{CustomerId, DomainError};
use oxbank_customers::{Customer, CustomerPatch, NewCustomer};

use crate::audit::append_in_tx;
use crate::error::{ServiceError, ServiceResult, map_sqlx_error};
use crate::session;

/// CRUD over customer records, privilege-gated per operation.
#[derive(Clone)]
pub struct CustomerDirectory {
    pool: PgPool,
    registry: Arc<dyn RoleRegistry>,
}

impl CustomerDirectory {
    pub fn new(pool: PgPool, registry: Arc<dyn RoleRegistry>) -> Self {
        Self { pool, registry }
    }

    /// Create a customer record. TELLER or MANAGER.
    #[instrument(skip(self, input), fields(principal = %principal), err)]
    pub async fn create_customer(
        &self,
        principal: &Principal,
        input: NewCustomer,
    ) -> ServiceResult<CustomerId> {
        let grant =
            authorize(self.registry.as_ref(), principal, Operation::CreateCustomer).await?;
        let input = input.validated()?;

        let mut tx = session::begin_unit_of_work(&self.pool, &grant).await?;

        let row = sqlx::query(
            r#"
            INSERT INTO customers (name, address, phone, email, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.address)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(principal.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_customer", e))?;

        let id = CustomerId::from_raw(
            row.try_get("id")
                .map_err(|e| ServiceError::Decode(e.to_string()))?,
        );

        let event = AuditEvent::new(
            principal.as_str(),
            AuditAction::Create,
            AuditedEntity::Customers,
            id.as_i64(),
        )
        .with_change(
            String::new(),
            format!(
                "name={}|address={}|phone={}|email={}",
                input.name, input.address, input.phone, input.email
            ),
        );
        append_in_tx(&mut tx, &event).await?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(id)
    }

    /// Fetch a customer record. TELLER, MANAGER or AUDITOR.
    ///
    /// The VIEW audit entry is part of the contract: no entry, no read.
    #[instrument(skip(self), fields(principal = %principal, customer_id = %customer_id), err)]
    pub async fn get_customer_details(
        &self,
        principal: &Principal,
        customer_id: CustomerId,
    ) -> ServiceResult<Customer> {
        let grant =
            authorize(self.registry.as_ref(), principal, Operation::GetCustomerDetails).await?;

        let mut tx = session::begin_unit_of_work(&self.pool, &grant).await?;

        let row = sqlx::query(
            r#"
            SELECT id, name, address, phone, email, created_by, created_at
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(customer_id.as_i64())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("select_customer", e))?;

        let customer = match row {
            Some(row) => customer_from_row(&row)?,
            None => return Err(DomainError::not_found("customer").into()),
        };

        let event = AuditEvent::new(
            principal.as_str(),
            AuditAction::View,
            AuditedEntity::Customers,
            customer_id.as_i64(),
        );
        append_in_tx(&mut tx, &event).await?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(customer)
    }

    /// Partially update a customer record. MANAGER only.
    ///
    /// The target row stays locked for the read-modify-write; the audit
    /// entry carries the full pre- and post-image snapshots.
    #[instrument(skip(self, patch), fields(principal = %principal, customer_id = %customer_id), err)]
    pub async fn update_customer(
        &self,
        principal: &Principal,
        customer_id: CustomerId,
        patch: CustomerPatch,
    ) -> ServiceResult<()> {
        let grant =
            authorize(self.registry.as_ref(), principal, Operation::UpdateCustomer).await?;

        let mut tx = session::begin_unit_of_work(&self.pool, &grant).await?;

        let row = sqlx::query(
            r#"
            SELECT id, name, address, phone, email, created_by, created_at
            FROM customers
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(customer_id.as_i64())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("lock_customer", e))?;

        let current = match row {
            Some(row) => customer_from_row(&row)?,
            None => return Err(DomainError::not_found("customer").into()),
        };

        let pre_image = current.snapshot();
        let updated = patch.apply_to(&current)?;

        sqlx::query(
            r#"
            UPDATE customers
            SET name = $1, address = $2, phone = $3, email = $4
            WHERE id = $5
            "#,
        )
        .bind(&updated.name)
        .bind(&updated.address)
        .bind(&updated.phone)
        .bind(&updated.email)
        .bind(customer_id.as_i64())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_customer", e))?;

        let event = AuditEvent::new(
            principal.as_str(),
            AuditAction::Update,
            AuditedEntity::Customers,
            customer_id.as_i64(),
        )
        .with_change(pre_image, updated.snapshot());
        append_in_tx(&mut tx, &event).await?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(())
    }
}

pub(crate) fn customer_from_row(row: &PgRow) -> ServiceResult<Customer> {
    let decode = |e: sqlx::Error| ServiceError::Decode(e.to_string());

    Ok(Customer {
        id: CustomerId::from_raw(row.try_get("id").map_err(decode)?),
        name: row.try_get("name").map_err(decode)?,
        address: row.try_get("address").map_err(decode)?,
        phone: row.try_get("phone").map_err(decode)?,
        email: row.try_get("email").map_err(decode)?,
        created_by: row.try_get("created_by").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
    })
}
