use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of an authenticated principal (human user or service account).
///
/// Principal names double as storage identities, so construction validates
/// the same character set an identifier-quoting layer would: lowercase ascii
/// letters, digits and underscores, starting with a letter, at most 63 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid principal name: {0}")]
pub struct InvalidPrincipal(pub String);

impl Principal {
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidPrincipal> {
        let name = name.into();
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) if first.is_ascii_lowercase() => {
                chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            }
            _ => false,
        };
        if !valid || name.len() > 63 {
            return Err(InvalidPrincipal(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Principal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Principal {
    type Err = InvalidPrincipal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Principal::new(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = InvalidPrincipal;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Principal::new(value)
    }
}

impl From<Principal> for String {
    fn from(value: Principal) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_lowercase_names() {
        assert!(Principal::new("alice").is_ok());
        assert!(Principal::new("svc_batch_01").is_ok());
    }

    #[test]
    fn rejects_unsafe_names() {
        assert!(Principal::new("").is_err());
        assert!(Principal::new("Alice").is_err());
        assert!(Principal::new("1alice").is_err());
        assert!(Principal::new("alice; drop table customers").is_err());
        assert!(Principal::new("a".repeat(64)).is_err());
    }
}
