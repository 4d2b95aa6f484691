use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    routing::post,
};

use oxbank_core::CustomerId;
use oxbank_customers::{CustomerPatch, NewCustomer};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_customer))
        .route("/:id", get(get_customer).patch(update_customer))
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateCustomerRequest>,
) -> axum::response::Response {
    let input = NewCustomer {
        name: body.name,
        address: body.address,
        phone: body.phone,
        email: body.email,
    };

    match services
        .customers
        .create_customer(principal.principal(), input)
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

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CustomerId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid customer id");
        }
    };

    match services
        .customers
        .get_customer_details(principal.principal(), id)
        .await
    {
        Ok(customer) => (StatusCode::OK, Json(dto::customer_to_json(&customer))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateCustomerRequest>,
) -> axum::response::Response {
    let id: CustomerId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid customer id");
        }
    };

    let patch = CustomerPatch {
        name: body.name,
        address: body.address,
        phone: body.phone,
        email: body.email,
    };

    match services
        .customers
        .update_customer(principal.principal(), id, patch)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "id": id.as_i64() })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
