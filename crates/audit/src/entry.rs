use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use oxbank_core::AuditEntryId;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    View,
    Approve,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::View => "VIEW",
            AuditAction::Approve => "APPROVE",
        }
    }
}

/// Which entity class was affected.
///
/// A closed enum rather than caller-supplied free text, serialized to the
/// table name. Old/new values stay caller-supplied text: callers self-report
/// the images, the service never cross-checks them against the named entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditedEntity {
    Customers,
    Accounts,
    Transactions,
}

impl AuditedEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditedEntity::Customers => "customers",
            AuditedEntity::Accounts => "accounts",
            AuditedEntity::Transactions => "transactions",
        }
    }
}

/// An audit event about to be recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub principal: String,
    pub action: AuditAction,
    pub entity: AuditedEntity,
    pub entity_id: i64,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub origin: Option<String>,
}

impl AuditEvent {
    pub fn new(
        principal: impl Into<String>,
        action: AuditAction,
        entity: AuditedEntity,
        entity_id: i64,
    ) -> Self {
        Self {
            principal: principal.into(),
            action,
            entity,
            entity_id,
            old_value: None,
            new_value: None,
            origin: None,
        }
    }

    pub fn with_change(
        mut self,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        self.old_value = Some(old_value.into());
        self.new_value = Some(new_value.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// A recorded audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub principal: String,
    pub action: AuditAction,
    pub entity: AuditedEntity,
    pub entity_id: i64,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub origin: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_builder_carries_images_and_origin() {
        let event = AuditEvent::new("alice", AuditAction::Update, AuditedEntity::Customers, 7)
            .with_change("name=a", "name=b")
            .with_origin("branch-01");

        assert_eq!(event.principal, "alice");
        assert_eq!(event.entity.as_str(), "customers");
        assert_eq!(event.old_value.as_deref(), Some("name=a"));
        assert_eq!(event.new_value.as_deref(), Some("name=b"));
        assert_eq!(event.origin.as_deref(), Some("branch-01"));
    }

    #[test]
    fn action_names_match_the_trail_vocabulary() {
        assert_eq!(AuditAction::Create.as_str(), "CREATE");
        assert_eq!(AuditAction::Approve.as_str(), "APPROVE");
        assert_eq!(AuditAction::View.as_str(), "VIEW");
        assert_eq!(AuditAction::Update.as_str(), "UPDATE");
    }
}
