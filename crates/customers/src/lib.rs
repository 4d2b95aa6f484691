//! `oxbank-customers` — Customer Directory domain model.

pub mod customer;

pub use customer::{Customer, CustomerPatch, NewCustomer};
