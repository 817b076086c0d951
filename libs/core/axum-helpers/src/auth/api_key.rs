use crate::errors::AppError;
use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Header carrying the API token
pub const API_KEY_HEADER: &str = "x-api-key";
/// Query parameter carrying the API token
pub const API_KEY_QUERY_PARAM: &str = "key";

/// Configured shared secret.
#[derive(Clone)]
pub struct ApiKeyAuth {
    token: Arc<str>,
}

impl ApiKeyAuth {
    pub fn new(token: impl Into<Arc<str>>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Constant-time comparison against the configured secret.
    pub fn verify(&self, presented: &str) -> bool {
        constant_time_eq::constant_time_eq(presented.as_bytes(), self.token.as_bytes())
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Pull the presented token: `?key=`, then `x-api-key`, then `Authorization: Bearer`.
fn extract_token(request: &Request) -> Option<String> {
    let headers: &HeaderMap = request.headers();
    Query::<HashMap<String, String>>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(mut params)| params.remove(API_KEY_QUERY_PARAM))
        .or_else(|| {
            headers
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|auth| auth.strip_prefix("Bearer "))
                .map(|s| s.trim().to_string())
        })
}

/// Rejects the request with 401 unless it presents the configured token.
pub async fn api_key_middleware(
    State(auth): State<ApiKeyAuth>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_token(&request) else {
        tracing::debug!(path = %request.uri().path(), "No API token presented");
        return Err(AppError::Unauthorized("unauthorized".to_string()));
    };

    if !auth.verify(&token) {
        tracing::debug!(path = %request.uri().path(), "API token mismatch");
        return Err(AppError::Unauthorized("unauthorized".to_string()));
    }

    Ok(next.run(request).await)
}
