//! Throwaway Redis for cache and event-stream tests.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::time::Duration;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::redis::Redis;

/// Redis 8 container plus a shared `ConnectionManager`.
///
/// The container is removed when the value is dropped.
///
/// ```no_run
/// use test_utils::TestRedis;
///
/// # async fn example() {
/// let redis = TestRedis::new().await;
/// let _manager = redis.connection();
/// assert_eq!(redis.wait_for_stream_len("note-events:CREATED", 0).await, 0);
/// # }
/// ```
pub struct TestRedis {
    _container: ContainerAsync<Redis>,
    connection: ConnectionManager,
}

impl TestRedis {
    pub async fn new() -> Self {
        let container = Redis::default()
            .with_tag("8-alpine")
            .start()
            .await
            .expect("Failed to start Redis container");
        let port = container
            .get_host_port_ipv4(6379)
            .await
            .expect("Failed to get Redis port");

        let client = redis::Client::open(format!("redis://127.0.0.1:{port}"))
            .expect("Invalid Redis URL");
        let connection = ConnectionManager::new(client)
            .await
            .expect("Failed to connect to Redis");

        tracing::info!(port, "Test Redis ready");
        Self {
            _container: container,
            connection,
        }
    }

    /// The connection the cache store and event bus are built from
    pub fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }

    pub async fn has_key(&self, key: &str) -> bool {
        let mut conn = self.connection();
        conn.exists(key).await.expect("EXISTS failed")
    }

    /// Poll `stream` until it holds `expected` entries or about 2.5s pass; returns the last length seen.
    ///
    /// Event delivery runs on a background task, so assertions on streams must wait.
    pub async fn wait_for_stream_len(&self, stream: &str, expected: usize) -> usize {
        let mut conn = self.connection();
        let mut len = 0;
        for _ in 0..50 {
            len = conn.xlen(stream).await.expect("XLEN failed");
            if len >= expected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        len
    }
}
