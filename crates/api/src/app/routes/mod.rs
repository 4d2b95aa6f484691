use axum::Router;

pub mod audit;
pub mod customers;
pub mod system;
pub mod transactions;

/// Protected domain routes (auth middleware applied by the app builder).
pub fn router() -> Router {
    Router::new()
        .nest("/customers", customers::router())
        .nest("/transactions", transactions::router())
        .nest("/audit", audit::router())
}
