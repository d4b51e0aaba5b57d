use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{Seed, WardStore};
use ward_client::HttpBedApi;
use ward_core::{BoardConfig, BoardController, Reconciler, RefreshOutcome};

/// Main entry point for the ward board application
///
/// Starts the development ward API and a board mirror concurrently:
/// - REST server on port 3000 (configurable via WARD_REST_ADDR)
/// - a reconciling board client pointed at WARD_API_URL, logging ward occupancy on each refresh
///
/// Both stop on Ctrl-C.
///
/// # Environment Variables
/// - `WARD_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `WARD_SEED_FILE`: YAML seed of wards and patients (default: built-in layout)
/// - `WARD_API_URL`: Ward API base URL for the mirror (default: "http://127.0.0.1:3000")
/// - `WARD_REFRESH_SECS`: Reconciliation interval (default: 30)
/// - `WARD_REQUEST_TIMEOUT_SECS`: Per-request timeout for the mirror (default: none)
///
/// # Errors
/// Returns an error if configuration is invalid, the seed cannot be loaded, or the REST address
/// cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ward=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("WARD_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let cfg = BoardConfig::from_env()?;
    let seed = Seed::from_env_value(std::env::var("WARD_SEED_FILE").ok())?;
    let store = Arc::new(WardStore::from_seed(seed)?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("-- Shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    tracing::info!("++ Starting ward REST on {}", listener.local_addr()?);
    tracing::info!("++ Mirroring board from {}", cfg.api_base_url());

    let mut server_shutdown = shutdown_rx.clone();
    let rest_server = async move {
        axum::serve(listener, api_rest::app(store))
            .with_graceful_shutdown(async move {
                while server_shutdown.changed().await.is_ok() {
                    if *server_shutdown.borrow() {
                        break;
                    }
                }
            })
            .await
    };

    let controller = BoardController::new(Arc::new(HttpBedApi::new(cfg.clone())?));
    let mirror = Reconciler::new(controller, &cfg).run(shutdown_rx, |outcome, board| {
        if outcome != RefreshOutcome::Applied {
            return;
        }
        for ward in board.occupancy() {
            tracing::info!(
                "{}: {}/{} occupied, {} available, {} waiting",
                ward.ward_name,
                ward.occupied,
                ward.capacity,
                ward.available,
                board.pool().len()
            );
        }
    });

    let (rest_result, ()) = tokio::join!(rest_server, mirror);
    rest_result?;

    Ok(())
}
