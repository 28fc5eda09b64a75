//! Notes Events Worker
//!
//! Reads the note lifecycle events published by `NoteService` and hands them
//! to a `NoteEventHandler`.
//!
//! ## Architecture
//!
//! ```text
//! NoteService (create / update / toggle / delete)
//!   ↓ NoteEventPublisher (bounded queue, fire-and-forget)
//! Redis Streams  note-events:CREATED | :UPDATED | :DELETED | :TOGGLED
//!   ↓ (Consumer Group: notes-events-worker)
//! NoteEventConsumer<LoggingNoteEventHandler>
//! ```
//!
//! The worker also owns the schema: pending migrations are applied against
//! `DATABASE_URL` before consuming starts.

use std::sync::Arc;

use core_config::{ConfigError, Environment, FromEnv, env_or_default, env_parse_nonzero};
use domain_notes::{ConsumerSettings, LoggingNoteEventHandler, NoteEventConsumer, NoteEventsConfig};
use eyre::{Result, WrapErr};
use migration::Migrator;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

/// Consumer-group settings read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// `NOTE_EVENTS_GROUP`
    pub group: String,
    /// `NOTE_EVENTS_BATCH_SIZE`
    pub batch_size: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            group: "notes-events-worker".to_string(),
            batch_size: 32,
        }
    }
}

impl FromEnv for WorkerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            group: env_or_default("NOTE_EVENTS_GROUP", &defaults.group),
            batch_size: env_parse_nonzero("NOTE_EVENTS_BATCH_SIZE", defaults.batch_size)?,
        })
    }
}

impl WorkerConfig {
    /// Consumer settings for `topic`
    pub fn consumer_settings(&self, topic: &str) -> ConsumerSettings {
        let mut settings = ConsumerSettings::new(topic, self.group.clone());
        settings.batch_size = self.batch_size;
        settings
    }
}

/// Run the notes events worker
///
/// 1. Sets up color-eyre and tracing (JSON for prod, pretty for dev)
/// 2. Applies pending migrations
/// 3. Connects to Redis and joins the consumer group on every event stream
/// 4. Consumes until Ctrl+C or SIGTERM
///
/// # Errors
///
/// Returns an error if configuration is invalid, a store is unreachable, or
/// the consumer groups cannot be created.
pub async fn run() -> Result<()> {
    core_config::tracing::install_color_eyre();
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        "Starting notes events worker"
    );

    let events_config =
        NoteEventsConfig::from_env().wrap_err("Failed to load note events configuration")?;
    let worker_config = WorkerConfig::from_env().wrap_err("Failed to load worker configuration")?;

    let db = database::postgres::connect_from_env()
        .await
        .wrap_err("Failed to connect to PostgreSQL")?;
    database::postgres::run_migrations::<Migrator>(&db, env!("CARGO_PKG_NAME"))
        .await
        .wrap_err("Failed to run migrations")?;

    let redis = database::redis::connect_from_env()
        .await
        .wrap_err("Failed to connect to Redis")?;

    let consumer = NoteEventConsumer::new(
        Arc::new(redis),
        worker_config.consumer_settings(&events_config.topic),
        LoggingNoteEventHandler,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        let _ = shutdown_tx.send(true);
    });

    consumer
        .run(shutdown_rx)
        .await
        .wrap_err("Note event consumer failed")?;

    info!("Notes events worker shut down");
    Ok(())
}

async fn shutdown_signal() -> Result<()> {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
            .wrap_err("Failed to install SIGTERM handler")?;

        tokio::select! {
            result = ctrl_c => {
                result.wrap_err("Failed to listen for Ctrl+C")?;
                info!("Received Ctrl+C, initiating shutdown...");
            },
            _ = terminate.recv() => {
                info!("Received SIGTERM, initiating shutdown...");
            },
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.wrap_err("Failed to listen for Ctrl+C")?;
        info!("Received Ctrl+C, initiating shutdown...");
    }

    Ok(())
}
