use std::{sync::Arc, time::Duration};

use log::info;
use r2d2_redis::{r2d2::Pool, RedisConnectionManager};

use super::{memory_store::MemoryStore, redis_store::RedisStore, DocumentStore, StoreError};
use crate::config::{Config, StoreKind};

/// Return a pool of connections to the redis server at `url`.
/// Connections are opened lazily, an unreachable server shows up on first use.
///
/// # Example
/// ```
/// let pool = redis_connect_to_db("redis://127.0.0.1/")?;
/// ```
pub fn redis_connect_to_db(url: &str) -> Result<Arc<Pool<RedisConnectionManager>>, StoreError> {
    let manager = RedisConnectionManager::new(url)?;
    let pool = Pool::builder()
        .connection_timeout(Duration::from_secs(5))
        .build_unchecked(manager);

    Ok(Arc::new(pool))
}

/// Opens the store selected by the configuration.
/// The handle is shared by every worker for the lifetime of the process.
pub fn open_store(config: &Config) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config.store {
        StoreKind::Redis => {
            info!("Connecting to redis store");
            let pool = redis_connect_to_db(&config.redis_url)?;
            Ok(Arc::new(RedisStore::new(pool)))
        }
        StoreKind::Memory => {
            info!("Using in-memory store, data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
