//! Request and response bodies of the expense endpoints.
//!
//! Request fields are all optional at the serde level so that missing or
//! blank values are reported by `validation` with field-level messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::Transaction;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    #[serde(rename = "expenseID", alias = "externalId")]
    pub expense_id: Option<String>,
    pub title: Option<String>,
    /// JSON number or numeric string.
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Value>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "date", alias = "occurredAt")]
    pub occurred_at: Option<String>,
    /// `CREDIT` or `DEBIT`; defaults to `DEBIT`.
    #[serde(rename = "type", alias = "kind")]
    pub kind: Option<String>,
}

/// Same shape as a create request; only `expenseID` is required. Owner,
/// creation time and internal id are not part of it and are dropped if sent.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTransactionRequest {
    #[serde(rename = "expenseID", alias = "externalId")]
    pub expense_id: Option<String>,
    pub title: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Value>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "date", alias = "occurredAt")]
    pub occurred_at: Option<String>,
    #[serde(rename = "type", alias = "kind")]
    pub kind: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DeleteTransactionRequest {
    #[serde(rename = "expenseID", alias = "externalId")]
    pub expense_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListTransactionsResponse {
    pub success: bool,
    pub expenses: Vec<Transaction>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    pub success: bool,
    pub message: String,
    pub data: Transaction,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Failure envelope. Not-found responses carry `message`, all others `error`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
