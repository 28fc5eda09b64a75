use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Note not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type NoteResult<T> = Result<T, NoteError>;

impl From<sea_orm::DbErr> for NoteError {
    fn from(err: sea_orm::DbErr) -> Self {
        NoteError::Persistence(err.to_string())
    }
}

/// Failure talking to the cache backend
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Failure submitting or delivering a note event
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event queue is full")]
    QueueFull,

    #[error("Event queue is closed")]
    QueueClosed,

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed event entry: {0}")]
    Malformed(String),
}

pub type EventResult<T> = Result<T, EventError>;
