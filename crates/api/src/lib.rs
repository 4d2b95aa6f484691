//! `oxbank-api` — thin HTTP surface over the banking core.
//!
//! Transport only: authentication middleware resolves the principal, routes
//! translate JSON to service calls, errors map to status codes. Every
//! business rule lives below this crate.

pub mod app;
pub mod context;
pub mod middleware;
