//! Query-string extractor with validation.

use crate::errors::AppError;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

/// `Query<T>` followed by `T::validate()`.
///
/// Parse failures (e.g. `limit=abc`) and validation failures (e.g.
/// `limit=0`) are both reported as 400 through [`AppError`].
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(data) = Query::<T>::from_request_parts(parts, state).await?;
        data.validate()?;
        Ok(ValidatedQuery(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Paging {
        #[validate(range(min = 1, max = 10))]
        limit: Option<u32>,
    }

    async fn handler(ValidatedQuery(p): ValidatedQuery<Paging>) -> String {
        p.limit.unwrap_or(5).to_string()
    }

    fn app() -> Router {
        Router::new().route("/", get(handler))
    }

    #[tokio::test]
    async fn test_valid_query_passes() {
        let response = app()
            .oneshot(Request::get("/?limit=3").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_out_of_range_is_bad_request() {
        let response = app()
            .oneshot(Request::get("/?limit=11").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unparseable_is_bad_request() {
        let response = app()
            .oneshot(Request::get("/?limit=abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
