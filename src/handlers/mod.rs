pub mod expenses;

use crate::domain::{Transaction, TransactionKind};
use crate::schemas::{
    CreateTransactionRequest, DeleteTransactionRequest, ErrorResponse, ListTransactionsResponse,
    MessageResponse, TransactionResponse, UpdateTransactionRequest,
};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub store: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthStatus),
        (status = 503, description = "Service is unhealthy", body = HealthStatus)
    ),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let store_up = match state.transactions.health_check().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Store health check failed");
            false
        }
    };

    let health_response = HealthStatus {
        status: if store_up { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: if store_up { "connected" } else { "disconnected" }.to_string(),
    };

    let status_code = if store_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health_response))
}

pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        expenses::get_expenses,
        expenses::add_expense,
        expenses::update_expense,
        expenses::delete_expense
    ),
    components(schemas(
        Transaction,
        TransactionKind,
        CreateTransactionRequest,
        UpdateTransactionRequest,
        DeleteTransactionRequest,
        ListTransactionsResponse,
        TransactionResponse,
        MessageResponse,
        ErrorResponse,
        HealthStatus
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "Expenses", description = "Per-user transaction records"),
        (name = "Health", description = "Liveness and store connectivity")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
