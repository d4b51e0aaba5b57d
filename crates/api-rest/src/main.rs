//! Standalone development ward API server.
//!
//! ## Purpose
//! Serves the ward API (with OpenAPI/Swagger UI) over an in-memory store so the board client and
//! CLI have something to talk to.
//!
//! ## Intended use
//! Development and debugging. The workspace's main `ward-run` binary runs this server alongside a
//! reconciling board mirror.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{Seed, WardStore};

/// Main entry point for the ward API server
///
/// # Environment Variables
/// - `WARD_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `WARD_SEED_FILE`: YAML seed of wards and patients (default: built-in two-ward layout)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the seed file cannot be read or is inconsistent,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("WARD_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let seed = Seed::from_env_value(std::env::var("WARD_SEED_FILE").ok())?;
    let store = Arc::new(WardStore::from_seed(seed)?);

    tracing::info!("-- Starting ward API on {}", addr);
    api_rest::serve(&addr, store).await
}
