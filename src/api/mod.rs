pub mod handlers;
pub mod models;
pub mod router;

use crate::channel::{CommandSender, ConnectionHandle};
use crate::config::{Config, ViewConfig};
use crate::engine::SharedEngine;
use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use std::net::SocketAddr;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: SharedEngine,
    pub conn: ConnectionHandle,
    pub commands: CommandSender,
    pub view: ViewConfig,
}

pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Binds the server to the configured port and starts serving.
    /// Adds the Prometheus layer and `/metrics` route on top of the read API.
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

        let app = router::build(self.state)
            .route("/metrics", get(move || async move { metric_handle.render() }))
            .layer(prometheus_layer);
        let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));

        tracing::info!("API server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
