use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use oxbank_core::{CustomerId, DomainError, DomainResult};

/// A customer record.
///
/// Records are created and amended through the directory only; there is no
/// delete path. `created_by` holds the principal the record was persisted
/// under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Flat field snapshot used as the audit pre/post image of an update.
    pub fn snapshot(&self) -> String {
        format!(
            "name={}|address={}|phone={}|email={}",
            self.name, self.address, self.phone, self.email
        )
    }
}

/// Validated input for `create_customer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl NewCustomer {
    /// Normalize and validate the input (basic checks, no external lookups).
    pub fn validated(self) -> DomainResult<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }

        let email = self.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }

        Ok(Self {
            name,
            address: self.address.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email,
        })
    }
}

/// Partial update for `update_customer`.
///
/// An absent field means "leave untouched", never "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.email.is_none()
    }

    /// Produce the post-update record, leaving absent fields unchanged.
    pub fn apply_to(&self, current: &Customer) -> DomainResult<Customer> {
        let mut updated = current.clone();

        if let Some(name) = &self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::validation("customer name cannot be empty"));
            }
            updated.name = name.to_string();
        }
        if let Some(address) = &self.address {
            updated.address = address.trim().to_string();
        }
        if let Some(phone) = &self.phone {
            updated.phone = phone.trim().to_string();
        }
        if let Some(email) = &self.email {
            let email = email.trim().to_lowercase();
            if email.is_empty() || !email.contains('@') {
                return Err(DomainError::validation("invalid email format"));
            }
            updated.email = email;
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing_customer() -> Customer {
        Customer {
            id: CustomerId::from_raw(1),
            name: "Ada Byron".to_string(),
            address: "12 Analytical Row".to_string(),
            phone: "555-0100".to_string(),
            email: "ada@example.com".to_string(),
            created_by: "alice".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn new_customer_is_normalized() {
        let input = NewCustomer {
            name: "  Ada Byron ".to_string(),
            address: " 12 Analytical Row ".to_string(),
            phone: "555-0100".to_string(),
            email: " Ada@Example.COM ".to_string(),
        };

        let validated = input.validated().unwrap();
        assert_eq!(validated.name, "Ada Byron");
        assert_eq!(validated.email, "ada@example.com");
    }

    #[test]
    fn new_customer_rejects_empty_name_and_bad_email() {
        let base = NewCustomer {
            name: "Ada".to_string(),
            address: String::new(),
            phone: String::new(),
            email: "ada@example.com".to_string(),
        };

        let err = NewCustomer {
            name: "   ".to_string(),
            ..base.clone()
        }
        .validated()
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = NewCustomer {
            email: "not-an-email".to_string(),
            ..base
        }
        .validated()
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn patch_leaves_absent_fields_untouched() {
        let current = existing_customer();
        let patch = CustomerPatch {
            phone: Some("555-0199".to_string()),
            ..Default::default()
        };

        let updated = patch.apply_to(&current).unwrap();
        assert_eq!(updated.phone, "555-0199");
        assert_eq!(updated.name, current.name);
        assert_eq!(updated.address, current.address);
        assert_eq!(updated.email, current.email);
    }

    #[test]
    fn patch_cannot_clear_the_name() {
        let current = existing_customer();
        let patch = CustomerPatch {
            name: Some("  ".to_string()),
            ..Default::default()
        };

        let err = patch.apply_to(&current).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn empty_patch_is_detectable() {
        assert!(CustomerPatch::default().is_empty());
        assert!(
            !CustomerPatch {
                name: Some("x".to_string()),
                ..Default::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn snapshot_concatenates_all_fields() {
        let customer = existing_customer();
        assert_eq!(
            customer.snapshot(),
            "name=Ada Byron|address=12 Analytical Row|phone=555-0100|email=ada@example.com"
        );
    }
}
