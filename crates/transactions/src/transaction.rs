use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use oxbank_core::{AccountId, CustomerId, DomainError, DomainResult, TransactionId};
use oxbank_ledger::AccountStatus;

/// Amounts strictly above this require manual manager approval.
///
/// Currency-unit-agnostic by design; the boundary itself auto-approves.
pub const APPROVAL_THRESHOLD: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdrawal => "WITHDRAWAL",
        }
    }
}

/// Transaction status lifecycle: `PendingApproval → Approved`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    PendingApproval,
    Approved,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::PendingApproval => "PENDING_APPROVAL",
            TransactionStatus::Approved => "APPROVED",
        }
    }
}

/// A transaction record. Amount is immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// The pending→approved transition.
    ///
    /// Anything not currently pending fails with the deliberately coarse
    /// `NotFoundOrNotPending` kind (already-approved rows included).
    pub fn approval_update(
        &self,
        approved_by: &str,
        at: DateTime<Utc>,
    ) -> DomainResult<Transaction> {
        if self.status != TransactionStatus::PendingApproval {
            return Err(DomainError::NotFoundOrNotPending);
        }

        let mut approved = self.clone();
        approved.status = TransactionStatus::Approved;
        approved.approved_by = Some(approved_by.to_string());
        approved.approved_at = Some(at);
        Ok(approved)
    }
}

/// Joined projection across transaction, account and customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub transaction: Transaction,
    pub account_balance: Decimal,
    pub account_status: AccountStatus,
    pub customer_id: CustomerId,
    pub customer_name: String,
}

/// Outcome of the creation-time threshold decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    /// At or below the threshold: approve and apply the balance inline.
    AutoApprove,
    /// Above the threshold: hold as pending, balance untouched until a
    /// manager approves.
    RequireApproval,
}

/// Decide whether an amount auto-approves or is held for manual approval.
pub fn decide_approval(amount: Decimal) -> ApprovalDecision {
    if amount > APPROVAL_THRESHOLD {
        ApprovalDecision::RequireApproval
    } else {
        ApprovalDecision::AutoApprove
    }
}

/// Amounts must be strictly positive.
pub fn validate_amount(amount: Decimal) -> DomainResult<()> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::validation("amount must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn pending_transaction() -> Transaction {
        Transaction {
            id: TransactionId::from_raw(1),
            account_id: AccountId::from_raw(1),
            amount: dec("15000"),
            kind: TransactionKind::Withdrawal,
            status: TransactionStatus::PendingApproval,
            description: "payroll run".to_string(),
            created_by: "alice".to_string(),
            created_at: Utc::now(),
            approved_by: None,
            approved_at: None,
        }
    }

    #[test]
    fn threshold_boundary_auto_approves_exactly_10000() {
        assert_eq!(decide_approval(dec("10000")), ApprovalDecision::AutoApprove);
        assert_eq!(decide_approval(dec("10000.00")), ApprovalDecision::AutoApprove);
        assert_eq!(
            decide_approval(dec("10000.01")),
            ApprovalDecision::RequireApproval
        );
        assert_eq!(decide_approval(dec("500")), ApprovalDecision::AutoApprove);
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        assert!(validate_amount(dec("0.01")).is_ok());
        assert!(matches!(
            validate_amount(Decimal::ZERO).unwrap_err(),
            DomainError::Validation(_)
        ));
        assert!(matches!(
            validate_amount(dec("-5")).unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn approval_sets_approver_and_timestamp() {
        let pending = pending_transaction();
        let at = Utc::now();

        let approved = pending.approval_update("bob", at).unwrap();
        assert_eq!(approved.status, TransactionStatus::Approved);
        assert_eq!(approved.approved_by.as_deref(), Some("bob"));
        assert_eq!(approved.approved_at, Some(at));
        // Amount and origin are immutable through the transition.
        assert_eq!(approved.amount, pending.amount);
        assert_eq!(approved.created_by, pending.created_by);
    }

    #[test]
    fn approving_twice_fails_with_the_coarse_kind() {
        let pending = pending_transaction();
        let approved = pending.approval_update("bob", Utc::now()).unwrap();

        let err = approved.approval_update("bob", Utc::now()).unwrap_err();
        assert_eq!(err, DomainError::NotFoundOrNotPending);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the decision is monotone in the amount. Anything held
        /// for approval is strictly larger than anything auto-approved.
        #[test]
        fn decision_is_monotone(a in 1u64..2_000_000u64, b in 1u64..2_000_000u64) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let lo = Decimal::new(lo as i64, 2);
            let hi = Decimal::new(hi as i64, 2);

            if decide_approval(lo) == ApprovalDecision::RequireApproval {
                prop_assert_eq!(decide_approval(hi), ApprovalDecision::RequireApproval);
            }
        }
    }
}
