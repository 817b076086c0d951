//! CV search API - Entry Point
//!
//! Minimal entry point that delegates to the library.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    cv_search_api::run().await
}
