//! `oxbank-auth` — pure authorization boundary for the banking core.
//!
//! This crate owns the role model, the capability catalogue and the
//! authorization gate that decides, per operation, *whose* privilege set
//! applies: the invoking principal's (run-as-caller) or the fixed audit
//! service identity's (run-as-service). It is intentionally decoupled from
//! HTTP and storage; the only IO is the `RoleRegistry` membership lookup.

pub mod capability;
pub mod claims;
pub mod gate;
pub mod principal;
pub mod registry;
pub mod roles;

pub use capability::{Capability, capabilities_for, roles_granting};
pub use claims::{AccessClaims, Hs256TokenVerifier, TokenValidationError, TokenVerifier, validate_claims};
pub use gate::{AuthzError, ELEVATED_STORAGE_ROLE, ExecutionMode, Grant, Operation, authorize};
pub use principal::{InvalidPrincipal, Principal};
pub use registry::{InMemoryRoleRegistry, RegistryError, RoleRegistry};
pub use roles::{Role, UnknownRole};
