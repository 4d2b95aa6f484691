//! `oxbank-audit` — Audit Service domain model.
//!
//! The audit trail is append-only and owned exclusively by the audit
//! service; no update or delete path exists anywhere in the workspace.

pub mod entry;
pub mod query;

pub use entry::{AuditAction, AuditEntry, AuditEvent, AuditedEntity};
pub use query::{AuditPage, AuditQuery, Pagination};
