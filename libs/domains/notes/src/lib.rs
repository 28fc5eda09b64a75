//! Notes Domain
//!
//! Daily notes and the mutation pipeline around them: every change is
//! written to the store, then the affected cache slots are evicted, then a
//! domain event is handed to the background publisher.
//!
//! ```text
//! NoteService ──► NoteRepository (PostgreSQL, transactional)
//!      │
//!      ├────────► NoteCacheService ──► CacheStore (Redis)
//!      │
//!      └────────► NoteEventPublisher ─(mpsc)─► delivery loop ──► EventBus (Redis Streams)
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_notes::{
//!     NewNote, NoteEventPublisher, NoteEventsConfig, NoteService, PgNoteRepository,
//!     RedisCacheStore, RedisEventBus,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = sea_orm::Database::connect("postgres://...").await?;
//! let redis = redis::aio::ConnectionManager::new(redis::Client::open("redis://...")?).await?;
//!
//! let config = NoteEventsConfig::default();
//! let bus = RedisEventBus::new(redis.clone(), config.max_stream_length);
//! let (publisher, _delivery) = NoteEventPublisher::spawn(bus, &config);
//!
//! let service = NoteService::new(
//!     PgNoteRepository::new(db),
//!     RedisCacheStore::new(redis),
//!     publisher,
//! );
//! let note = service.create_note(NewNote::new("Groceries", "milk", 1.0)).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod consumer;
pub mod entity;
pub mod error;
pub mod events;
pub mod models;
pub mod postgres;
pub mod publisher;
pub mod repository;
pub mod service;

pub use cache::{CacheName, CacheStore, NoteCacheService, RedisCacheStore};
pub use config::{NoteCacheConfig, NoteEventsConfig};
pub use consumer::{ConsumerSettings, LoggingNoteEventHandler, NoteEventConsumer, NoteEventHandler};
pub use error::{CacheError, EventError, NoteError, NoteResult};
pub use events::{NoteEvent, NoteEventKind};
pub use models::{ModifiedNote, NewNote, Note, NoteChange, UpdateNote};
pub use postgres::PgNoteRepository;
pub use publisher::{DeliveryReceipt, EventBus, NoteEventPublisher, RedisEventBus};
pub use repository::NoteRepository;
pub use service::NoteService;
