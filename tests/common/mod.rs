use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use xpensia_core::adapters::MemoryTransactionRepository;
use xpensia_core::identity::{IdentityVerifier, VerificationError, VerifiedIdentity};
use xpensia_core::{create_app, AppState, HttpSettings};

pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB_TOKEN: &str = "bob-token";

/// Accepts a fixed set of tokens, each mapped to a uid.
pub struct StaticVerifier {
    tokens: HashMap<String, String>,
}

impl StaticVerifier {
    pub fn new() -> Self {
        let tokens = [(ALICE_TOKEN, "alice"), (BOB_TOKEN, "bob")]
            .into_iter()
            .map(|(token, uid)| (token.to_string(), uid.to_string()))
            .collect();
        Self { tokens }
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerificationError> {
        self.tokens
            .get(token)
            .map(|uid| VerifiedIdentity {
                uid: uid.clone(),
                email: None,
            })
            .ok_or_else(|| VerificationError::Invalid("unknown token".to_string()))
    }
}

pub async fn setup_test_app() -> (String, MemoryTransactionRepository) {
    let repository = MemoryTransactionRepository::new();
    let state = AppState::new(
        Arc::new(repository.clone()),
        Arc::new(StaticVerifier::new()),
        HttpSettings::default(),
    );
    let app = create_app(state);

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], 0));
    let server = axum::Server::bind(&addr).serve(app.into_make_service());
    let actual_addr = server.local_addr();

    tokio::spawn(async move {
        server.await.unwrap();
    });

    (format!("http://{}", actual_addr), repository)
}
