use core_config::{ConfigError, FromEnv, env_or_default, env_parse_nonzero};
use std::time::Duration;

pub const DEFAULT_TOPIC: &str = "note-events";

/// Event publication settings
#[derive(Debug, Clone)]
pub struct NoteEventsConfig {
    /// Stream prefix; each kind lands on `{topic}:{KIND}`
    pub topic: String,
    /// Outbound queue slots before submissions are dropped
    pub queue_capacity: usize,
    /// Approximate `MAXLEN` per partition stream
    pub max_stream_length: i64,
}

impl Default for NoteEventsConfig {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            queue_capacity: 1024,
            max_stream_length: 100_000,
        }
    }
}

impl FromEnv for NoteEventsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            topic: env_or_default("NOTE_EVENTS_TOPIC", DEFAULT_TOPIC),
            queue_capacity: env_parse_nonzero(
                "NOTE_EVENTS_QUEUE_CAPACITY",
                defaults.queue_capacity,
            )?,
            max_stream_length: env_parse_nonzero(
                "NOTE_EVENTS_MAX_STREAM_LENGTH",
                defaults.max_stream_length,
            )?,
        })
    }
}

/// Read-path cache settings
#[derive(Debug, Clone)]
pub struct NoteCacheConfig {
    pub ttl: Duration,
}

impl Default for NoteCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
        }
    }
}

impl FromEnv for NoteCacheConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secs = env_parse_nonzero("NOTE_CACHE_TTL_SECS", 600u64)?;
        Ok(Self {
            ttl: Duration::from_secs(secs),
        })
    }
}
