use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::schemas::{
    CreateTransactionRequest, DeleteTransactionRequest, ErrorResponse, ListTransactionsResponse,
    MessageResponse, TransactionResponse, UpdateTransactionRequest,
};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/getExpenses",
    responses(
        (status = 200, description = "Caller's transactions, newest date first", body = ListTransactionsResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Expenses"
)]
pub async fn get_expenses(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ListTransactionsResponse>, AppError> {
    tracing::info!(uid = %user.uid, "Fetching expenses");
    let expenses = state.transactions.list(&user.uid).await?;
    tracing::info!(count = expenses.len(), "Found transactions");

    Ok(Json(ListTransactionsResponse {
        success: true,
        expenses,
    }))
}

#[utoipa::path(
    post,
    path = "/addExpense",
    request_body = CreateTransactionRequest,
    responses(
        (status = 200, description = "Transaction stored", body = TransactionResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 409, description = "expenseID already exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Expenses"
)]
pub async fn add_expense(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionResponse>, AppError> {
    let Json(payload) = payload?;
    let data = state.transactions.create(&user.uid, payload).await?;

    Ok(Json(TransactionResponse {
        success: true,
        message: "Transaction added".to_string(),
        data,
    }))
}

#[utoipa::path(
    put,
    path = "/updateExpense",
    request_body = UpdateTransactionRequest,
    responses(
        (status = 200, description = "Transaction updated", body = TransactionResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "Transaction not found or unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Expenses"
)]
pub async fn update_expense(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<UpdateTransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionResponse>, AppError> {
    let Json(payload) = payload?;
    let data = state.transactions.update(&user.uid, payload).await?;

    Ok(Json(TransactionResponse {
        success: true,
        message: "Transaction updated".to_string(),
        data,
    }))
}

#[utoipa::path(
    delete,
    path = "/deleteExpense",
    request_body = DeleteTransactionRequest,
    responses(
        (status = 200, description = "Transaction deleted", body = MessageResponse),
        (status = 400, description = "Missing expenseID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "Transaction not found or unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Expenses"
)]
pub async fn delete_expense(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<DeleteTransactionRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Json(payload) = payload?;
    state.transactions.delete(&user.uid, payload.expense_id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Transaction deleted".to_string(),
    }))
}
