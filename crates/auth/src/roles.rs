use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role identifier used for RBAC.
///
/// The role set is closed: membership is managed by an external identity
/// process, the core only asks whether a principal holds one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Teller,
    Manager,
    Auditor,
}

impl Role {
    /// All roles, in the order the gate probes them.
    pub const ALL: [Role; 3] = [Role::Teller, Role::Manager, Role::Auditor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teller => "TELLER",
            Role::Manager => "MANAGER",
            Role::Auditor => "AUDITOR",
        }
    }

    /// The storage group role a unit of work assumes when running with this
    /// role's privileges.
    pub fn storage_role(&self) -> &'static str {
        match self {
            Role::Teller => "oxbank_teller",
            Role::Manager => "oxbank_manager",
            Role::Auditor => "oxbank_auditor",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Role names compare case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownRole(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("teller".parse::<Role>().unwrap(), Role::Teller);
        assert_eq!("Manager".parse::<Role>().unwrap(), Role::Manager);
        assert_eq!("AUDITOR".parse::<Role>().unwrap(), Role::Auditor);
        assert_eq!(" manager ".parse::<Role>().unwrap(), Role::Manager);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "admin".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRole("admin".to_string()));
    }
}
