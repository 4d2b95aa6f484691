//! `oxbank-transactions` — Transaction Engine domain model.

pub mod transaction;

pub use transaction::{
    APPROVAL_THRESHOLD, ApprovalDecision, Transaction, TransactionDetails, TransactionKind,
    TransactionStatus, decide_approval, validate_amount,
};
