//! Audit trail query interface.
//!
//! Results are finite, ordered by recording time descending, and restartable:
//! a caller can re-issue the same query with the next offset and continue
//! where the previous page ended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::AuditEntry;

/// Pagination parameters for audit queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of entries to return.
    pub limit: u32,
    /// Offset for pagination (0-based).
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(50).min(1000), // Cap at 1000 for safety
            offset: offset.unwrap_or(0),
        }
    }
}

/// Filter criteria for an audit trail query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditQuery {
    /// Entries recorded at or after this time.
    pub start: DateTime<Utc>,
    /// Entries recorded at or before this time; `None` means "now, as of
    /// query execution".
    pub end: Option<DateTime<Utc>>,
    /// Restrict to entries recorded for one principal (optional).
    pub principal: Option<String>,
}

impl AuditQuery {
    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: None,
            principal: None,
        }
    }

    pub fn until(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn for_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    /// The effective end of the range, given the execution clock.
    pub fn effective_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.end.unwrap_or(now)
    }
}

/// One page of audit query results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditPage {
    pub entries: Vec<AuditEntry>,
    pub pagination: Pagination,
    /// Whether another page exists beyond this one.
    pub has_more: bool,
}

impl AuditPage {
    /// Pagination for the next page, if any.
    pub fn next(&self) -> Option<Pagination> {
        self.has_more.then(|| Pagination {
            limit: self.pagination.limit,
            offset: self.pagination.offset + self.pagination.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_caps_the_limit() {
        let p = Pagination::new(Some(10_000), None);
        assert_eq!(p.limit, 1000);
        assert_eq!(p.offset, 0);

        let p = Pagination::new(None, Some(25));
        assert_eq!(p.limit, 50);
        assert_eq!(p.offset, 25);
    }

    #[test]
    fn end_defaults_to_execution_time() {
        let start = Utc::now();
        let now = start + chrono::Duration::minutes(5);

        let query = AuditQuery::since(start);
        assert_eq!(query.effective_end(now), now);

        let fixed = start + chrono::Duration::minutes(2);
        let query = AuditQuery::since(start).until(fixed);
        assert_eq!(query.effective_end(now), fixed);
    }

    #[test]
    fn next_page_advances_by_limit() {
        let page = AuditPage {
            entries: Vec::new(),
            pagination: Pagination {
                limit: 50,
                offset: 100,
            },
            has_more: true,
        };
        let next = page.next().unwrap();
        assert_eq!(next.offset, 150);

        let done = AuditPage {
            has_more: false,
            ..page
        };
        assert!(done.next().is_none());
    }
}
