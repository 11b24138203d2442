use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use chrono::Utc;
use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::{HeaderMap, CACHE_CONTROL};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{IdentityVerifier, VerificationError, VerifiedIdentity};

/// Public keys Firebase Auth signs ID tokens with.
pub const GOOGLE_SECURE_TOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const ISSUER_PREFIX: &str = "https://securetoken.google.com/";
const DEFAULT_KEY_TTL: Duration = Duration::from_secs(3600);
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
const MAX_SUBJECT_LEN: usize = 128;
const CLOCK_SKEW_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    iat: i64,
    #[serde(default)]
    auth_time: Option<i64>,
    #[serde(default)]
    email: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
    expires_at: Instant,
}

/// Verifies Firebase ID tokens (RS256 JWTs) for one Firebase project.
///
/// Signing keys are cached for as long as the key endpoint's
/// `Cache-Control: max-age` allows and refetched when a token names a key id
/// the cache does not know.
#[derive(Clone)]
pub struct FirebaseVerifier {
    client: Client,
    project_id: String,
    jwks_url: String,
    keys: Arc<ArcSwapOption<CachedKeys>>,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

impl FirebaseVerifier {
    pub fn new(project_id: String, jwks_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        let backoff = backoff::equal_jittered(Duration::from_secs(10), Duration::from_secs(60));
        let policy = failure_policy::consecutive_failures(3, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        Self {
            client,
            project_id,
            jwks_url,
            keys: Arc::new(ArcSwapOption::empty()),
            circuit_breaker,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Fetches the key set now, bypassing the cache. Returns the number of keys.
    pub async fn refresh_keys(&self) -> Result<usize, VerificationError> {
        let cached = self.fetch_keys().await?;
        Ok(cached.keys.keys.len())
    }

    async fn fetch_keys(&self) -> Result<Arc<CachedKeys>, VerificationError> {
        let client = self.client.clone();
        let url = self.jwks_url.clone();

        let result = self
            .circuit_breaker
            .call(async move {
                let response = client.get(&url).send().await?.error_for_status()?;
                let ttl = max_age(response.headers()).unwrap_or(DEFAULT_KEY_TTL);
                let keys = response.json::<JwkSet>().await?;
                Ok::<_, reqwest::Error>((keys, ttl))
            })
            .await;

        let (keys, ttl) = match result {
            Ok(fetched) => fetched,
            Err(FailsafeError::Rejected) => {
                return Err(VerificationError::Unavailable(
                    "signing key endpoint circuit breaker is open".to_string(),
                ))
            }
            Err(FailsafeError::Inner(e)) => {
                return Err(VerificationError::Unavailable(format!(
                    "failed to fetch signing keys: {}",
                    e
                )))
            }
        };

        let now = Instant::now();
        let cached = Arc::new(CachedKeys {
            keys,
            fetched_at: now,
            expires_at: now + ttl,
        });
        self.keys.store(Some(cached.clone()));

        tracing::info!(
            keys = cached.keys.keys.len(),
            ttl_secs = ttl.as_secs(),
            "Refreshed identity signing keys"
        );

        Ok(cached)
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, VerificationError> {
        let now = Instant::now();
        let cached = match self.keys.load_full() {
            Some(cached) if cached.expires_at > now => {
                if cached.keys.find(kid).is_none()
                    && now.duration_since(cached.fetched_at) >= MIN_REFRESH_INTERVAL
                {
                    self.fetch_keys().await?
                } else {
                    cached
                }
            }
            _ => self.fetch_keys().await?,
        };

        let jwk = cached
            .keys
            .find(kid)
            .ok_or_else(|| VerificationError::Invalid(format!("unknown signing key '{}'", kid)))?;

        DecodingKey::from_jwk(jwk)
            .map_err(|e| VerificationError::Invalid(format!("unusable signing key '{}': {}", kid, e)))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = CLOCK_SKEW_SECS as u64;
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!("{}{}", ISSUER_PREFIX, self.project_id)]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);
        validation
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerificationError> {
        let header = decode_header(token)
            .map_err(|e| VerificationError::Invalid(format!("malformed token: {}", e)))?;

        if header.alg != Algorithm::RS256 {
            return Err(VerificationError::Invalid(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| VerificationError::Invalid("token has no key id".to_string()))?;

        let key = self.decoding_key(&kid).await?;
        let data = decode::<FirebaseClaims>(token, &key, &self.validation()).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => VerificationError::Expired,
                _ => VerificationError::Invalid(e.to_string()),
            }
        })?;
        let claims = data.claims;

        if claims.sub.is_empty() || claims.sub.len() > MAX_SUBJECT_LEN {
            return Err(VerificationError::Invalid(
                "subject must be between 1 and 128 characters".to_string(),
            ));
        }

        let latest_allowed = Utc::now().timestamp() + CLOCK_SKEW_SECS;
        if claims.iat > latest_allowed {
            return Err(VerificationError::Invalid("token issued in the future".to_string()));
        }
        if claims.auth_time.is_some_and(|auth_time| auth_time > latest_allowed) {
            return Err(VerificationError::Invalid(
                "authentication time is in the future".to_string(),
            ));
        }

        Ok(VerifiedIdentity {
            uid: claims.sub,
            email: claims.email,
        })
    }
}

/// Extracts `max-age` from a `Cache-Control` header.
fn max_age(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(CACHE_CONTROL)?
        .to_str()
        .ok()?
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|seconds| seconds.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
