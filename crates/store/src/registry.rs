//! Postgres-backed role registry.

use sqlx::PgPool;

use oxbank_auth::{Principal, RegistryError, Role, RoleRegistry};

/// Role-membership lookup against the `role_grants` relation.
///
/// Membership is managed by an external identity process; this reads it
/// freshly on every call (no caching), comparing role names
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct PgRoleRegistry {
    pool: PgPool,
}

impl PgRoleRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RoleRegistry for PgRoleRegistry {
    async fn has_role(&self, principal: &Principal, role: Role) -> Result<bool, RegistryError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM role_grants
                WHERE principal = $1 AND lower(role) = lower($2)
            )
            "#,
        )
        .bind(principal.as_str())
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RegistryError(e.to_string()))
    }
}
