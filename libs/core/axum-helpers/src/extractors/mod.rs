//! Custom extractors for Axum handlers.
//!
//! Extractors reject with [`AppError`](crate::AppError) so failures
//! share the service-wide error envelope.

pub mod validated_query;

pub use validated_query::ValidatedQuery;
