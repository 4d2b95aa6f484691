use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use oxbank_auth::AuthzError;
use oxbank_core::DomainError;
use oxbank_store::ServiceError;
use oxbank_transactions::TransactionKind;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(DomainError::Validation(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        ServiceError::Domain(DomainError::NotFound(entity)) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{entity} not found"))
        }
        ServiceError::Domain(DomainError::NotFoundOrNotPending) => json_error(
            StatusCode::NOT_FOUND,
            "not_found_or_not_pending",
            "transaction not found or not pending approval",
        ),
        ServiceError::Domain(err @ DomainError::InsufficientFunds { .. }) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "insufficient_funds", err.to_string())
        }
        ServiceError::Authz(err @ AuthzError::Denied { .. }) => {
            json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
        }
        ServiceError::Authz(err @ AuthzError::StorageDenied(_)) => {
            json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
        }
        ServiceError::Authz(err @ AuthzError::Registry(_)) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "registry_error",
            err.to_string(),
        ),
        ServiceError::ConflictOrTimeout(msg) => {
            json_error(StatusCode::CONFLICT, "conflict_or_timeout", msg)
        }
        ServiceError::Decode(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "decode_error", msg)
        }
        ServiceError::Storage(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage_error",
            format!("{e:?}"),
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_transaction_kind(s: &str) -> Result<TransactionKind, axum::response::Response> {
    match s.to_lowercase().as_str() {
        "deposit" => Ok(TransactionKind::Deposit),
        "withdrawal" => Ok(TransactionKind::Withdrawal),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            "invalid_transaction_kind",
            "kind must be one of: deposit, withdrawal",
        )),
    }
}
