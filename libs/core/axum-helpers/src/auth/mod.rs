//! Shared-secret authorization.
//!
//! Every domain route sits behind [`api_key_middleware`]; callers present the
//! secret as a `key` query parameter, an `x-api-key` header, or a bearer token.
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::auth::{ApiKeyAuth, api_key_middleware};
//!
//! let auth = ApiKeyAuth::new(config.api_token.clone());
//!
//! let protected = Router::new()
//!     .route("/search", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(auth, api_key_middleware));
//! ```

pub mod api_key;

pub use api_key::{API_KEY_HEADER, API_KEY_QUERY_PARAM, ApiKeyAuth, api_key_middleware};
