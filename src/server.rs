//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, the enrichment worker, and Axum server lifecycle.

use crate::api::responder::RedirectResponder;
use crate::application::services::{
    ClickService, EnrichmentService, IdentityService, LinkService, QueuedEnrichmentTrigger,
};
use crate::config::Config;
use crate::domain::enrichment_worker::run_enrichment_worker;
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::infrastructure::geoip::GeoIpService;
use crate::infrastructure::persistence::{PgClickRepository, PgLinkRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// How long in-flight enrichment jobs may run after the server stops.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - GeoIP database (optional)
/// - Background enrichment worker
/// - Axum HTTP server
///
/// On Ctrl+C or SIGTERM the server stops accepting connections, finishes
/// open requests, then gives the enrichment worker time to drain its queue.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Migrations fail
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let geoip = match &config.geoip_city_db {
        Some(path) => match GeoIpService::open(path) {
            Ok(service) => {
                tracing::info!("GeoIP enrichment enabled");
                Some(service)
            }
            Err(e) => {
                tracing::warn!("{:#}. Geo enrichment disabled.", e);
                None
            }
        },
        None => {
            tracing::info!("GeoIP enrichment disabled");
            None
        }
    };

    let pool = Arc::new(pool);
    let link_repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool.clone()));
    let click_repository: Arc<dyn ClickRepository> =
        Arc::new(PgClickRepository::new(pool.clone()));

    let (job_tx, job_rx) = mpsc::channel(config.enrichment_queue_capacity);
    let worker = tokio::spawn(run_enrichment_worker(
        job_rx,
        Arc::new(EnrichmentService::new(geoip)),
        click_repository.clone(),
        config.enrichment_worker_concurrency,
    ));
    tracing::info!(
        concurrency = config.enrichment_worker_concurrency,
        "Enrichment worker started"
    );

    let identity_service = Arc::new(IdentityService::new(config.identity_secret.clone()));
    let state = AppState {
        identity_service: identity_service.clone(),
        link_service: Arc::new(LinkService::new(link_repository.clone())),
        click_service: Arc::new(ClickService::new(
            click_repository,
            link_repository.clone(),
        )),
        enrichment_trigger: Arc::new(QueuedEnrichmentTrigger::new(job_tx)),
        responder: Arc::new(RedirectResponder::new(
            identity_service,
            config.secure_cookies(),
        )),
        link_repository,
        behind_proxy: config.behind_proxy,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router owned the last sender; the worker sees a closed queue now.
    match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => tracing::info!("Enrichment worker drained"),
        Ok(Err(e)) => tracing::error!("Enrichment worker panicked: {}", e),
        Err(_) => tracing::warn!("Enrichment worker did not drain in time"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
