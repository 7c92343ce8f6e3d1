//! Scrape HTTP server.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use chatpulse_metrics::Aggregator;
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::health_api;
use crate::scrape::{self, GaugeExporter};

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub aggregator: Aggregator,
    pub exporter: Arc<GaugeExporter>,
}

impl GatewayState {
    pub fn new(aggregator: Aggregator) -> Result<Self> {
        Ok(Self {
            aggregator,
            exporter: Arc::new(GaugeExporter::new()?),
        })
    }
}

pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/metrics", get(scrape::metrics))
        .route("/api/health", get(health_api::get_health))
        .with_state(state)
}

/// Bind the scrape listener. Done before anything else starts, so a taken
/// port fails startup.
pub async fn bind(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {addr}"))
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
#[instrument(skip_all)]
pub async fn start_server<F>(listener: TcpListener, state: GatewayState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("HTTP /metrics on http://{}/metrics", listener.local_addr()?);
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("HTTP server stopped");
    Ok(())
}
