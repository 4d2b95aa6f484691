//! `oxbank-ledger` — Account Ledger domain model.
//!
//! Balances are mutated exclusively by the transaction engine through the
//! pure application rules in [`account`]; no other component writes them.

pub mod account;

pub use account::{Account, AccountStatus, apply_deposit, apply_withdrawal};
