use std::sync::Arc;

use sqlx::PgPool;

use oxbank_store::{AuditLog, CustomerDirectory, PgRoleRegistry, TransactionEngine};

/// The wired service set shared by all routes.
pub struct AppServices {
    pub customers: CustomerDirectory,
    pub engine: TransactionEngine,
    pub audit: AuditLog,
}

pub fn build_services(pool: PgPool) -> AppServices {
    let registry = Arc::new(PgRoleRegistry::new(pool.clone()));

    AppServices {
        customers: CustomerDirectory::new(pool.clone(), registry.clone()),
        engine: TransactionEngine::new(pool.clone(), registry.clone()),
        audit: AuditLog::new(pool, registry),
    }
}
