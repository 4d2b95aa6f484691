use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use oxbank_core::{AccountId, TransactionId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_transaction))
        .route("/:id", get(get_transaction))
        .route("/:id/approve", post(approve_transaction))
}

pub async fn create_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateTransactionRequest>,
) -> axum::response::Response {
    let kind = match errors::parse_transaction_kind(&body.kind) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    match services
        .engine
        .create_transaction(
            principal.principal(),
            AccountId::from_raw(body.account_id),
            body.amount,
            kind,
            &body.description,
        )
        .await
    {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": id.as_i64() })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn approve_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: TransactionId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid transaction id",
            );
        }
    };

    match services
        .engine
        .approve_transaction(principal.principal(), id)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "id": id.as_i64(), "status": "APPROVED" })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_transaction(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: TransactionId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid transaction id",
            );
        }
    };

    match services
        .engine
        .get_transaction_details(principal.principal(), id)
        .await
    {
        Ok(details) => (StatusCode::OK, Json(dto::details_to_json(&details))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
