use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::config::{Config, RedisConfig};
use crate::routes::{self, AppState};
use crate::store::{MemoryStore, RedisStore};
use crate::Error;

pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let state = if config.in_memory {
        info!("Using the in-memory store");
        AppState::connected(Arc::new(MemoryStore::new()))
    } else {
        bootstrap(&config.redis).await
    };

    let listener = TcpListener::bind(config.listen).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, routes::router(state)).await?;

    Ok(())
}

/// Makes the single connection attempt of the process. On failure the server keeps running
/// and every data route reports the connection as unavailable; there is no reconnect.
pub async fn bootstrap(config: &RedisConfig) -> AppState {
    match RedisStore::connect(config).await {
        Ok(store) => AppState::connected(Arc::new(store)),
        Err(e) => {
            error!("Failed to connect to Redis: {}", e);
            AppState::unavailable()
        }
    }
}
