use anyhow::{Context, Result};
use log::{info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::handlers::AppState;
use crate::api::routes::create_router;
use crate::config::AppConfig;
use crate::database::{self, SqliteHistoryOracle};
use crate::matching::MatchingEngine;
use crate::notifier::{DeadLetters, OrchestratorClient, delivery_channel};
use crate::scheduler::Scheduler;
use crate::services::queues::QueueService;

pub struct ServerService {
    port: u16,
    config: AppConfig,
}

impl ServerService {
    pub fn new(port: u16, config: AppConfig) -> Self {
        Self { port, config }
    }

    pub async fn run(&self) -> Result<()> {
        let pool = database::create_pool(&self.config.database.path)?;
        database::setup::apply_schema(&mut database::get_connection(&pool)?)
            .context("Failed to prepare database schema")?;

        let oracle = Arc::new(SqliteHistoryOracle::new(pool.clone()));
        let engine = Arc::new(MatchingEngine::new(oracle, self.config.matchmaking.clone()));
        let queues = QueueService::new(Arc::clone(&engine), self.config.database.reload_timeout);

        // an unreachable game store only means we start with empty pools
        if let Err(e) = queues.populate().await {
            warn!("Initial queue population failed: {:#}", e);
        }

        let client = OrchestratorClient::new(&self.config.notifier)?;
        info!("Matches will be reported to {}", client.match_url());
        let dead_letters = DeadLetters::new();
        let (deliveries, worker) =
            delivery_channel(client, &self.config.notifier, dead_letters.clone());
        let worker = tokio::spawn(worker.run());
        let scheduler = tokio::spawn(Scheduler::new(Arc::clone(&engine), deliveries.clone()).run());

        let state = Arc::new(AppState {
            engine,
            pool,
            config: self.config.clone(),
            queues,
            deliveries,
            dead_letters,
        });

        let app = create_router(state).layer(CorsLayer::permissive());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        scheduler.abort();
        worker.abort();
        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
