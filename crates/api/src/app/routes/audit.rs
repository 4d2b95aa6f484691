use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use oxbank_audit::{AuditAction, AuditEvent, AuditQuery, AuditedEntity, Pagination};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/events", post(record_event))
        .route("/log", get(query_log))
}

pub async fn record_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::RecordAuditEventRequest>,
) -> axum::response::Response {
    let action = match parse_action(&body.action) {
        Ok(v) => v,
        Err(response) => return response,
    };
    let entity = match parse_entity(&body.entity) {
        Ok(v) => v,
        Err(response) => return response,
    };

    let mut event = AuditEvent::new(
        principal.principal().as_str(),
        action,
        entity,
        body.entity_id,
    );
    event.old_value = body.old_value;
    event.new_value = body.new_value;
    event.origin = body.origin;

    match services.audit.record(principal.principal(), event).await {
        Ok(entry) => (
            StatusCode::CREATED,
            Json(dto::audit_entry_to_json(&entry)),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn query_log(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(params): Query<dto::AuditLogParams>,
) -> axum::response::Response {
    let mut query = AuditQuery::since(params.start);
    query.end = params.end;
    query.principal = params.principal;

    let page = Pagination::new(params.limit, params.offset);

    match services.audit.query(principal.principal(), query, page).await {
        Ok(page) => {
            let items = page
                .entries
                .iter()
                .map(dto::audit_entry_to_json)
                .collect::<Vec<_>>();
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "items": items,
                    "has_more": page.has_more,
                    "next_offset": page.next().map(|p| p.offset),
                })),
            )
                .into_response()
        }
        Err(e) => errors::service_error_to_response(e),
    }
}

fn parse_action(s: &str) -> Result<AuditAction, axum::response::Response> {
    match s.to_lowercase().as_str() {
        "create" => Ok(AuditAction::Create),
        "update" => Ok(AuditAction::Update),
        "view" => Ok(AuditAction::View),
        "approve" => Ok(AuditAction::Approve),
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_action",
            "action must be one of: create, update, view, approve",
        )),
    }
}

fn parse_entity(s: &str) -> Result<AuditedEntity, axum::response::Response> {
    match s.to_lowercase().as_str() {
        "customers" => Ok(AuditedEntity::Customers),
        "accounts" => Ok(AuditedEntity::Accounts),
        "transactions" => Ok(AuditedEntity::Transactions),
        _ => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_entity",
            "entity must be one of: customers, accounts, transactions",
        )),
    }
}
