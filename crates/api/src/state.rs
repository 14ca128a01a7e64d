use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::engine::RunEngine;
use crate::validator::PowstonClient;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: rulestudio_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Template execution engine (single runs and suite runs).
    pub engine: Arc<RunEngine>,
    /// HTTP client for the Powston validation endpoint.
    pub validator: Arc<PowstonClient>,
}

impl AppState {
    /// Assemble the state from a pool and configuration. Used by both the
    /// binary entrypoint and the integration test harness.
    pub fn new(pool: rulestudio_db::DbPool, config: ServerConfig) -> Self {
        let engine = RunEngine::new(
            pool.clone(),
            Duration::from_secs(config.run_timeout_secs),
        );
        let validator = PowstonClient::new(
            config.powston_base_url.clone(),
            config.powston_api_key.clone(),
        );

        Self {
            pool,
            config: Arc::new(config),
            engine: Arc::new(engine),
            validator: Arc::new(validator),
        }
    }
}
