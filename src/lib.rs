pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod ports;
pub mod schemas;
pub mod services;
pub mod startup;
pub mod utils;
pub mod validation;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::identity::IdentityVerifier;
use crate::ports::TransactionRepository;
use crate::services::TransactionService;

/// Per-request behaviour shared by the middleware stack.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Upper bound for each call to the identity verifier or the store.
    pub request_timeout: Duration,
    pub log_request_body: bool,
    /// `None` allows any origin.
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            log_request_body: false,
            cors_allowed_origins: None,
        }
    }
}

impl From<&Config> for HttpSettings {
    fn from(config: &Config) -> Self {
        Self {
            request_timeout: config.request_timeout,
            log_request_body: config.log_request_body,
            cors_allowed_origins: config.cors_allowed_origins.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub transactions: TransactionService,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub settings: HttpSettings,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn TransactionRepository>,
        verifier: Arc<dyn IdentityVerifier>,
        settings: HttpSettings,
    ) -> Self {
        Self {
            transactions: TransactionService::new(repository, settings.request_timeout),
            verifier,
            settings,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let expenses = Router::new()
        .route("/getExpenses", get(handlers::expenses::get_expenses))
        .route("/addExpense", post(handlers::expenses::add_expense))
        .route("/updateExpense", put(handlers::expenses::update_expense))
        .route("/deleteExpense", delete(handlers::expenses::delete_expense))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_auth));

    let cors = middleware::cors::cors_layer(state.settings.cors_allowed_origins.as_deref());

    Router::new()
        .route("/health", get(handlers::health))
        .route("/openapi.json", get(handlers::openapi))
        .merge(expenses)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::request_logger_middleware,
        ))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryTransactionRepository;
    use crate::identity::{VerificationError, VerifiedIdentity};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    struct FixedVerifier;

    #[async_trait]
    impl IdentityVerifier for FixedVerifier {
        async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerificationError> {
            match token {
                "good" => Ok(VerifiedIdentity {
                    uid: "u1".to_string(),
                    email: None,
                }),
                _ => Err(VerificationError::Invalid("unknown".to_string())),
            }
        }
    }

    struct StalledVerifier;

    #[async_trait]
    impl IdentityVerifier for StalledVerifier {
        async fn verify(&self, _token: &str) -> Result<VerifiedIdentity, VerificationError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(VerificationError::Unavailable("never".to_string()))
        }
    }

    fn add_expense_request_with(token: &str, description: &str) -> Request<Body> {
        let body = serde_json::json!({
            "expenseID": "e1",
            "title": "Coffee",
            "amount": "4.50",
            "category": "Food",
            "date": "2024-05-01",
            "description": description
        })
        .to_string();

        Request::builder()
            .method(Method::POST)
            .uri("/addExpense")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap()
    }

    fn add_expense_request(token: &str) -> Request<Body> {
        add_expense_request_with(token, "")
    }

    #[tokio::test]
    async fn test_body_logging_keeps_request_body_intact() {
        let repo = MemoryTransactionRepository::new();
        let settings = HttpSettings {
            log_request_body: true,
            ..Default::default()
        };
        let app = create_app(AppState::new(
            Arc::new(repo.clone()),
            Arc::new(FixedVerifier),
            settings,
        ));

        let response = app.oneshot(add_expense_request("good")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_body_logging_passes_large_bodies_through_unread() {
        let repo = MemoryTransactionRepository::new();
        let settings = HttpSettings {
            log_request_body: true,
            ..Default::default()
        };
        let app = create_app(AppState::new(
            Arc::new(repo.clone()),
            Arc::new(FixedVerifier),
            settings,
        ));

        let description = "x".repeat(3000);
        let response = app
            .oneshot(add_expense_request_with("good", &description))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let stored = repo.find_one("e1", "u1").await.unwrap().unwrap();
        assert_eq!(stored.description, description);
    }

    #[tokio::test]
    async fn test_verifier_timeout_is_unauthorized() {
        let repo = MemoryTransactionRepository::new();
        let settings = HttpSettings {
            request_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let app = create_app(AppState::new(
            Arc::new(repo.clone()),
            Arc::new(StalledVerifier),
            settings,
        ));

        let response = app.oneshot(add_expense_request("good")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(repo.call_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = create_app(AppState::new(
            Arc::new(MemoryTransactionRepository::new()),
            Arc::new(FixedVerifier),
            HttpSettings::default(),
        ));

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/updateExpense")
            .header(header::AUTHORIZATION, "Bearer good")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cors_preflight_is_answered() {
        let app = create_app(AppState::new(
            Arc::new(MemoryTransactionRepository::new()),
            Arc::new(FixedVerifier),
            HttpSettings::default(),
        ));

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/addExpense")
            .header(header::ORIGIN, "https://app.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
