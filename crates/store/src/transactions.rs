//! Transaction Engine service.
//!
//! The state machine behind deposits and withdrawals: amounts at or below
//! the approval threshold settle inline; larger ones are held as
//! `PENDING_APPROVAL` with the balance untouched until a manager approves.
//! Lock discipline: the transaction row is locked before its account row,
//! and balances are only ever written under the account row lock. The audit
//! append is the last statement before commit and takes no exclusive locks.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction as SqlxTransaction};
use std::sync::Arc;
use tracing::instrument;

use oxbank_audit::{AuditAction, AuditEvent, AuditedEntity};
use oxbank_auth::{Operation, Principal, RoleRegistry, authorize};
use oxbank_core::{AccountId, CustomerId, DomainError, TransactionId};
use oxbank_ledger::{Account, AccountStatus, apply_deposit, apply_withdrawal};
use oxbank_transactions::{
    ApprovalDecision, Transaction, TransactionDetails, TransactionKind, TransactionStatus,
    decide_approval, validate_amount,
};

use crate::audit::append_in_tx;
use crate::error::{ServiceError, ServiceResult, map_sqlx_error};
use crate::session;

/// Creates, approves and projects transactions; sole writer of balances.
#[derive(Clone)]
pub struct TransactionEngine {
    pool: PgPool,
    registry: Arc<dyn RoleRegistry>,
}

impl TransactionEngine {
    pub fn new(pool: PgPool, registry: Arc<dyn RoleRegistry>) -> Self {
        Self { pool, registry }
    }

    /// Create a transaction. TELLER or MANAGER.
    ///
    /// Holds the account row lock for the duration of the call. Amounts
    /// above the threshold are stored pending with no balance change; at or
    /// below it, the balance is applied inline (a withdrawal that would
    /// overdraw fails and nothing persists, not even the transaction row).
    #[instrument(
        skip(self, description),
        fields(principal = %principal, account_id = %account_id, %amount, ?kind),
        err
    )]
    pub async fn create_transaction(
        &self,
        principal: &Principal,
        account_id: AccountId,
        amount: Decimal,
        kind: TransactionKind,
        description: &str,
    ) -> ServiceResult<TransactionId> {
        let grant =
            authorize(self.registry.as_ref(), principal, Operation::CreateTransaction).await?;
        validate_amount(amount)?;

        let mut tx = session::begin_unit_of_work(&self.pool, &grant).await?;

        let account = lock_account(&mut tx, account_id).await?;
        if !account.can_transact() {
            return Err(DomainError::validation("account is not active").into());
        }

        let status = match decide_approval(amount) {
            ApprovalDecision::RequireApproval => TransactionStatus::PendingApproval,
            ApprovalDecision::AutoApprove => {
                let new_balance = match kind {
                    TransactionKind::Deposit => apply_deposit(account.balance, amount),
                    TransactionKind::Withdrawal => apply_withdrawal(account.balance, amount)?,
                };
                write_balance(&mut tx, account_id, new_balance).await?;
                TransactionStatus::Approved
            }
        };

        let row = sqlx::query(
            r#"
            INSERT INTO transactions
                (account_id, amount, kind, status, description, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(account_id.as_i64())
        .bind(amount)
        .bind(kind.as_str())
        .bind(status.as_str())
        .bind(description)
        .bind(principal.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_transaction", e))?;

        let id = TransactionId::from_raw(
            row.try_get("id")
                .map_err(|e| ServiceError::Decode(e.to_string()))?,
        );

        let event = AuditEvent::new(
            principal.as_str(),
            AuditAction::Create,
            AuditedEntity::Transactions,
            id.as_i64(),
        )
        .with_change(
            String::new(),
            format!("{} {} -> {}", kind.as_str(), amount, status.as_str()),
        );
        append_in_tx(&mut tx, &event).await?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(id)
    }

    /// Approve a pending transaction. MANAGER only.
    ///
    /// The manager check is a logic-level gate decision on top of the
    /// storage update grant, which alone is too coarse to distinguish
    /// approving from editing. Withdrawal sufficiency is re-checked against
    /// the *current* balance; on failure the transaction stays pending and
    /// no APPROVE entry is recorded.
    #[instrument(skip(self), fields(principal = %principal, transaction_id = %transaction_id), err)]
    pub async fn approve_transaction(
        &self,
        principal: &Principal,
        transaction_id: TransactionId,
    ) -> ServiceResult<()> {
        let grant =
            authorize(self.registry.as_ref(), principal, Operation::ApproveTransaction).await?;

        let mut tx = session::begin_unit_of_work(&self.pool, &grant).await?;

        // Absent id and non-pending status are indistinguishable here,
        // deliberately: one coarse error kind for both.
        let row = sqlx::query(
            r#"
            SELECT id, account_id, amount, kind, status, description,
                   created_by, created_at, approved_by, approved_at
            FROM transactions
            WHERE id = $1 AND status = 'PENDING_APPROVAL'
            FOR UPDATE
            "#,
        )
        .bind(transaction_id.as_i64())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("lock_transaction", e))?;

        let pending = match row {
            Some(row) => transaction_from_row(&row)?,
            None => return Err(DomainError::NotFoundOrNotPending.into()),
        };

        let account = lock_account(&mut tx, pending.account_id).await?;

        let approved = pending.approval_update(principal.as_str(), Utc::now())?;
        let new_balance = match approved.kind {
            TransactionKind::Deposit => apply_deposit(account.balance, approved.amount),
            TransactionKind::Withdrawal => apply_withdrawal(account.balance, approved.amount)?,
        };

        write_balance(&mut tx, approved.account_id, new_balance).await?;

        sqlx::query(
            r#"
            UPDATE transactions
            SET status = 'APPROVED', approved_by = $1, approved_at = $2
            WHERE id = $3
            "#,
        )
        .bind(approved.approved_by.as_deref())
        .bind(approved.approved_at)
        .bind(transaction_id.as_i64())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("approve_transaction", e))?;

        let event = AuditEvent::new(
            principal.as_str(),
            AuditAction::Approve,
            AuditedEntity::Transactions,
            transaction_id.as_i64(),
        )
        .with_change(
            TransactionStatus::PendingApproval.as_str(),
            TransactionStatus::Approved.as_str(),
        );
        append_in_tx(&mut tx, &event).await?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(())
    }

    /// Joined projection across transaction, account and customer.
    /// TELLER, MANAGER or AUDITOR; audited like every read.
    #[instrument(skip(self), fields(principal = %principal, transaction_id = %transaction_id), err)]
    pub async fn get_transaction_details(
        &self,
        principal: &Principal,
        transaction_id: TransactionId,
    ) -> ServiceResult<TransactionDetails> {
        let grant = authorize(
            self.registry.as_ref(),
            principal,
            Operation::GetTransactionDetails,
        )
        .await?;

        let mut tx = session::begin_unit_of_work(&self.pool, &grant).await?;

        let row = sqlx::query(
            r#"
            SELECT t.id, t.account_id, t.amount, t.kind, t.status, t.description,
                   t.created_by, t.created_at, t.approved_by, t.approved_at,
                   a.balance AS account_balance, a.status AS account_status,
                   a.customer_id, c.name AS customer_name
            FROM transactions t
            JOIN accounts a ON a.id = t.account_id
            JOIN customers c ON c.id = a.customer_id
            WHERE t.id = $1
            "#,
        )
        .bind(transaction_id.as_i64())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("select_transaction_details", e))?;

        let details = match row {
            Some(row) => {
                let decode = |e: sqlx::Error| ServiceError::Decode(e.to_string());
                let account_status: String = row.try_get("account_status").map_err(decode)?;
                TransactionDetails {
                    transaction: transaction_from_row(&row)?,
                    account_balance: row.try_get("account_balance").map_err(decode)?,
                    account_status: parse_account_status(&account_status)?,
                    customer_id: CustomerId::from_raw(
                        row.try_get("customer_id").map_err(decode)?,
                    ),
                    customer_name: row.try_get("customer_name").map_err(decode)?,
                }
            }
            None => return Err(DomainError::not_found("transaction").into()),
        };

        let event = AuditEvent::new(
            principal.as_str(),
            AuditAction::View,
            AuditedEntity::Transactions,
            transaction_id.as_i64(),
        );
        append_in_tx(&mut tx, &event).await?;

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(details)
    }
}

/// Lock an account row for read-modify-write.
async fn lock_account(
    tx: &mut SqlxTransaction<'static, Postgres>,
    account_id: AccountId,
) -> ServiceResult<Account> {
    let row = sqlx::query(
        r#"
        SELECT id, customer_id, balance, status, created_at
        FROM accounts
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(account_id.as_i64())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("lock_account", e))?;

    match row {
        Some(row) => account_from_row(&row),
        None => Err(DomainError::not_found("account").into()),
    }
}

async fn write_balance(
    tx: &mut SqlxTransaction<'static, Postgres>,
    account_id: AccountId,
    balance: Decimal,
) -> ServiceResult<()> {
    sqlx::query("UPDATE accounts SET balance = $1 WHERE id = $2")
        .bind(balance)
        .bind(account_id.as_i64())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("write_balance", e))?;
    Ok(())
}

fn account_from_row(row: &PgRow) -> ServiceResult<Account> {
    let decode = |e: sqlx::Error| ServiceError::Decode(e.to_string());
    let status: String = row.try_get("status").map_err(decode)?;

    Ok(Account {
        id: AccountId::from_raw(row.try_get("id").map_err(decode)?),
        customer_id: CustomerId::from_raw(row.try_get("customer_id").map_err(decode)?),
        balance: row.try_get("balance").map_err(decode)?,
        status: parse_account_status(&status)?,
        created_at: row.try_get("created_at").map_err(decode)?,
    })
}

fn transaction_from_row(row: &PgRow) -> ServiceResult<Transaction> {
    let decode = |e: sqlx::Error| ServiceError::Decode(e.to_string());
    let kind: String = row.try_get("kind").map_err(decode)?;
    let status: String = row.try_get("status").map_err(decode)?;

    Ok(Transaction {
        id: TransactionId::from_raw(row.try_get("id").map_err(decode)?),
        account_id: AccountId::from_raw(row.try_get("account_id").map_err(decode)?),
        amount: row.try_get("amount").map_err(decode)?,
        kind: parse_kind(&kind)?,
        status: parse_status(&status)?,
        description: row.try_get("description").map_err(decode)?,
        created_by: row.try_get("created_by").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
        approved_by: row.try_get("approved_by").map_err(decode)?,
        approved_at: row.try_get("approved_at").map_err(decode)?,
    })
}

fn parse_kind(s: &str) -> ServiceResult<TransactionKind> {
    match s {
        "DEPOSIT" => Ok(TransactionKind::Deposit),
        "WITHDRAWAL" => Ok(TransactionKind::Withdrawal),
        other => Err(ServiceError::Decode(format!(
            "unknown transaction kind '{other}'"
        ))),
    }
}

fn parse_status(s: &str) -> ServiceResult<TransactionStatus> {
    match s {
        "PENDING_APPROVAL" => Ok(TransactionStatus::PendingApproval),
        "APPROVED" => Ok(TransactionStatus::Approved),
        other => Err(ServiceError::Decode(format!(
            "unknown transaction status '{other}'"
        ))),
    }
}

fn parse_account_status(s: &str) -> ServiceResult<AccountStatus> {
    match s {
        "ACTIVE" => Ok(AccountStatus::Active),
        "FROZEN" => Ok(AccountStatus::Frozen),
        other => Err(ServiceError::Decode(format!(
            "unknown account status '{other}'"
        ))),
    }
}
