//! Cache coordinator for note reads.
//!
//! Two logical caches are kept: `notesById` keyed by note id and `notesByDate`
//! keyed by ISO date. The mutation pipeline only evicts; the read paths in
//! [`crate::service`] fill the caches on miss.

use async_trait::async_trait;
use chrono::NaiveDate;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;
use strum::{AsRefStr, Display};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::CacheResult;

/// Logical cache names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum CacheName {
    #[strum(serialize = "notesById")]
    NotesById,
    #[strum(serialize = "notesByDate")]
    NotesByDate,
}

/// Physical key for `key` inside `cache`
pub fn cache_key(cache: CacheName, key: &str) -> String {
    format!("{cache}::{key}")
}

/// Key/value backend behind the note caches
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, cache: CacheName, key: &str) -> CacheResult<Option<String>>;

    async fn put(&self, cache: CacheName, key: &str, value: &str, ttl: Duration)
    -> CacheResult<()>;

    async fn evict(&self, cache: CacheName, key: &str) -> CacheResult<()>;

    /// Drop every entry of `cache`
    async fn clear(&self, cache: CacheName) -> CacheResult<()>;
}

/// Redis-backed [`CacheStore`]
#[derive(Clone)]
pub struct RedisCacheStore {
    redis: Arc<ConnectionManager>,
}

impl RedisCacheStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self {
            redis: Arc::new(redis),
        }
    }
}

const SCAN_BATCH: usize = 500;

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, cache: CacheName, key: &str) -> CacheResult<Option<String>> {
        let mut conn = (*self.redis).clone();
        let value: Option<String> = conn.get(cache_key(cache, key)).await?;
        Ok(value)
    }

    async fn put(
        &self,
        cache: CacheName,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> CacheResult<()> {
        let mut conn = (*self.redis).clone();
        let _: () = conn
            .set_ex(cache_key(cache, key), value, ttl.as_secs().max(1))
            .await?;
        Ok(())
    }

    async fn evict(&self, cache: CacheName, key: &str) -> CacheResult<()> {
        let mut conn = (*self.redis).clone();
        let _: () = conn.del(cache_key(cache, key)).await?;
        Ok(())
    }

    async fn clear(&self, cache: CacheName) -> CacheResult<()> {
        let mut conn = (*self.redis).clone();
        let pattern = format!("{cache}::*");
        let mut cursor: u64 = 0;
        let mut removed = 0usize;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                removed += keys.len();
                let _: () = conn.del(keys).await?;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(cache = %cache, removed, "Cleared cache");
        Ok(())
    }
}

/// Invalidation-only view over the note caches.
///
/// Backend failures are logged and swallowed: the store write that preceded
/// the eviction has already committed and must not be reported as failed.
pub struct NoteCacheService<C: CacheStore> {
    store: Arc<C>,
}

impl<C: CacheStore> Clone for NoteCacheService<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<C: CacheStore> NoteCacheService<C> {
    pub fn new(store: Arc<C>) -> Self {
        Self { store }
    }

    /// Remove the `notesById` entry for `note_id`
    pub async fn evict_by_id(&self, note_id: Uuid) {
        let key = note_id.to_string();
        if let Err(e) = self.store.evict(CacheName::NotesById, &key).await {
            warn!(%note_id, error = %e, "Failed to evict note from cache");
        }
    }

    /// Remove the `notesByDate` entry for `date`; `None` clears the whole cache
    pub async fn evict_by_date(&self, date: Option<NaiveDate>) {
        match date {
            Some(date) => {
                let key = date.to_string();
                if let Err(e) = self.store.evict(CacheName::NotesByDate, &key).await {
                    warn!(%date, error = %e, "Failed to evict date from cache");
                }
            }
            None => {
                if let Err(e) = self.store.clear(CacheName::NotesByDate).await {
                    warn!(error = %e, "Failed to clear date cache");
                }
            }
        }
    }

    /// Evict each present date once; absent entries are skipped
    pub async fn evict_by_dates(&self, dates: &[Option<NaiveDate>]) {
        let mut seen: Vec<NaiveDate> = Vec::with_capacity(dates.len());
        for date in dates.iter().flatten() {
            if seen.contains(date) {
                continue;
            }
            seen.push(*date);
            self.evict_by_date(Some(*date)).await;
        }
    }
}
