use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, State},
    http::{header::CONTENT_LENGTH, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::AppState;

const MAX_BODY_LOG_SIZE: usize = 1024;
const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn request_logger_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next<Body>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("request", request_id = %request_id);

    async move {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let start = Instant::now();

        let req = if !state.settings.log_request_body {
            tracing::info!(method = %method, uri = %uri, "Incoming request");
            req
        } else if let Some(skipped) = unbuffered_body(req.headers()) {
            tracing::info!(method = %method, uri = %uri, body = %skipped, "Incoming request");
            req
        } else {
            let (parts, body) = req.into_parts();
            let bytes = match Bytes::from_request(Request::new(body), &()).await {
                Ok(bytes) => bytes,
                Err(rejection) => {
                    tracing::warn!(method = %method, uri = %uri, "Failed to read request body");
                    return rejection.into_response();
                }
            };

            tracing::info!(
                method = %method,
                uri = %uri,
                body_size = bytes.len(),
                body = %describe_body(&bytes),
                "Incoming request"
            );

            Request::from_parts(parts, Body::from(bytes))
        };

        let mut response = next.run(req).await;

        tracing::info!(
            method = %method,
            uri = %uri,
            status = response.status().as_u16(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Outgoing response"
        );

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        response
    }
    .instrument(span)
    .await
}

/// Describes a body that is not buffered for logging: one without a declared
/// length or declared larger than `MAX_BODY_LOG_SIZE`. `None` means the body
/// is small enough to read.
fn unbuffered_body(headers: &HeaderMap) -> Option<String> {
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<usize>().ok());

    match declared {
        Some(len) if len <= MAX_BODY_LOG_SIZE => None,
        Some(len) => Some(format!("[omitted, {} bytes]", len)),
        None => Some("[omitted, unknown length]".to_string()),
    }
}

fn describe_body(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "[empty]".to_string();
    }
    if bytes.len() > MAX_BODY_LOG_SIZE {
        return format!("[omitted, {} bytes]", bytes.len());
    }

    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(json) => {
            let sanitized = crate::utils::sanitize::sanitize_json(&json);
            serde_json::to_string(&sanitized).unwrap_or_else(|_| "[invalid json]".to_string())
        }
        Err(_) => format!("[non-json, {} bytes]", bytes.len()),
    }
}
