use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use oxbank_core::{AccountId, CustomerId, DomainError, DomainResult};

/// Account status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    Active,
    Frozen,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Frozen => "FROZEN",
        }
    }
}

/// An account row as the ledger sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub customer_id: CustomerId,
    pub balance: Decimal,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Frozen accounts accept no new transactions.
    pub fn can_transact(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Apply a deposit: unconditional addition.
pub fn apply_deposit(balance: Decimal, amount: Decimal) -> Decimal {
    balance + amount
}

/// Apply a withdrawal against the current balance.
///
/// Invariant: the resulting balance is never negative; an overdraw fails
/// with `InsufficientFunds` and leaves the balance untouched.
pub fn apply_withdrawal(balance: Decimal, amount: Decimal) -> DomainResult<Decimal> {
    if balance < amount {
        return Err(DomainError::insufficient_funds(amount, balance));
    }
    Ok(balance - amount)
}
