//! Server Implementation
//!
//! HTTP 服务器启动和管理

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api;
use crate::core::{Config, Result, ServerState};
use crate::orders::OrderPollWorker;
use crate::stock::StockSweepWorker;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (for sharing with tooling)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        // Create application state if not provided
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        // Start background workers
        let shutdown = CancellationToken::new();
        let stock_worker = StockSweepWorker::new(
            state.stock_sync.clone(),
            Duration::from_secs(self.config.stock_sync_interval_minutes * 60),
            shutdown.clone(),
        );
        tokio::spawn(stock_worker.run());

        let order_worker = OrderPollWorker::new(
            state.order_sync.clone(),
            Duration::from_secs(self.config.order_poll_interval_minutes * 60),
            shutdown.clone(),
        );
        tokio::spawn(order_worker.run());

        let app = api::router(state);

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("🔁 Sync Server listening on {addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
            })
            .await?;

        // Stop the workers once the listener is gone
        shutdown.cancel();

        Ok(())
    }
}
