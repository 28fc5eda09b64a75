//! Redis connection shared by the note cache and the note event bus.

use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use crate::retry::{RetryConfig, retry_connect};

/// Connect to Redis and verify the link with `PING`.
///
/// The returned `ConnectionManager` reconnects on its own after transient failures.
pub async fn connect(url: &str) -> redis::RedisResult<ConnectionManager> {
    info!(url, "Connecting to Redis");

    let client = Client::open(url)?;
    let manager = ConnectionManager::new(client).await?;

    let mut conn = manager.clone();
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;

    info!("Connected to Redis");
    Ok(manager)
}

/// [`connect`] retried per `retry_config`
pub async fn connect_with_retry(
    url: &str,
    retry_config: &RetryConfig,
) -> redis::RedisResult<ConnectionManager> {
    retry_connect(retry_config, || connect(url)).await
}

/// Connect using `REDIS_HOST`
#[cfg(feature = "config")]
pub async fn connect_from_env() -> crate::DatabaseResult<ConnectionManager> {
    use core_config::FromEnv;

    let config = core_config::redis::RedisConfig::from_env()?;
    Ok(connect_with_retry(&config.uri, &RetryConfig::default()).await?)
}
