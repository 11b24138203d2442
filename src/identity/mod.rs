//! Bearer-token verification.
//!
//! The access guard only depends on [`IdentityVerifier`]; the Firebase
//! implementation is wired in by `main`.

pub mod firebase;

use async_trait::async_trait;
use thiserror::Error;

pub use firebase::FirebaseVerifier;

/// Subject a token resolved to, plus the claims handlers may care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
}

#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerificationError>;
}
