//! Request/response DTOs and JSON mapping helpers.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use oxbank_customers::Customer;
use oxbank_audit::AuditEntry;
use oxbank_transactions::TransactionDetails;

#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    pub account_id: i64,
    pub amount: Decimal,
    pub kind: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct RecordAuditEventRequest {
    pub action: String,
    pub entity: String,
    pub entity_id: i64,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub origin: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuditLogParams {
    /// RFC 3339; entries recorded at or after this instant.
    pub start: chrono::DateTime<chrono::Utc>,
    /// RFC 3339; defaults to "now" when absent.
    pub end: Option<chrono::DateTime<chrono::Utc>>,
    pub principal: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub fn customer_to_json(customer: &Customer) -> Value {
    json!({
        "id": customer.id.as_i64(),
        "name": customer.name,
        "address": customer.address,
        "phone": customer.phone,
        "email": customer.email,
        "created_by": customer.created_by,
        "created_at": customer.created_at,
    })
}

pub fn details_to_json(details: &TransactionDetails) -> Value {
    let t = &details.transaction;
    json!({
        "id": t.id.as_i64(),
        "account_id": t.account_id.as_i64(),
        "amount": t.amount,
        "kind": t.kind.as_str(),
        "status": t.status.as_str(),
        "description": t.description,
        "created_by": t.created_by,
        "created_at": t.created_at,
        "approved_by": t.approved_by,
        "approved_at": t.approved_at,
        "account": {
            "balance": details.account_balance,
            "status": details.account_status.as_str(),
            "customer_id": details.customer_id.as_i64(),
            "customer_name": details.customer_name,
        },
    })
}

pub fn audit_entry_to_json(entry: &AuditEntry) -> Value {
    json!({
        "id": entry.id.as_i64(),
        "principal": entry.principal,
        "action": entry.action.as_str(),
        "entity": entry.entity.as_str(),
        "entity_id": entry.entity_id,
        "old_value": entry.old_value,
        "new_value": entry.new_value,
        "origin": entry.origin,
        "recorded_at": entry.recorded_at,
    })
}
