use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::AppState;

const NO_TOKEN: &str = "No token provided";
const INVALID_TOKEN: &str = "Invalid token";

/// Identity attached to a request once its bearer token has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub uid: String,
    pub email: Option<String>,
}

/// Returns the token of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Rejects the request with 401 unless it carries a token the identity
/// verifier accepts. Nothing downstream runs for rejected requests.
pub async fn require_auth<B>(
    State(state): State<AppState>,
    mut req: Request<B>,
    next: Next<B>,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| AppError::Unauthorized(NO_TOKEN.to_string()))?
        .to_string();

    let verification =
        tokio::time::timeout(state.settings.request_timeout, state.verifier.verify(&token)).await;

    let identity = match verification {
        Ok(Ok(identity)) => identity,
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "Token verification failed");
            return Err(AppError::Unauthorized(INVALID_TOKEN.to_string()));
        }
        Err(_) => {
            tracing::warn!(
                timeout_ms = state.settings.request_timeout.as_millis() as u64,
                "Token verification timed out"
            );
            return Err(AppError::Unauthorized(INVALID_TOKEN.to_string()));
        }
    };

    req.extensions_mut().insert(AuthenticatedUser {
        uid: identity.uid,
        email: identity.email,
    });

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized(NO_TOKEN.to_string()))
    }
}
