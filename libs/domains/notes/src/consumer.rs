//! Reader side of the note event streams.
//!
//! Reads every `{topic}:{KIND}` partition through one consumer group,
//! dispatches each decoded event to a [`NoteEventHandler`] and acknowledges
//! it. Entries that fail to decode are logged and acknowledged so they are
//! not redelivered.

use async_trait::async_trait;
use redis::RedisResult;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;
use strum::IntoEnumIterator;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::{EventError, EventResult};
use crate::events::{NoteEvent, NoteEventKind};
use crate::publisher::partition_stream;

type StreamReply = Vec<(String, Vec<(String, Vec<(String, String)>)>)>;

/// Reaction to delivered note events
#[async_trait]
pub trait NoteEventHandler: Send + Sync {
    async fn on_created(&self, event: &NoteEvent);
    async fn on_updated(&self, event: &NoteEvent);
    async fn on_deleted(&self, event: &NoteEvent);
    async fn on_toggled(&self, event: &NoteEvent);
}

/// Route `event` to the handler method for its kind
pub async fn dispatch<H: NoteEventHandler + ?Sized>(handler: &H, event: &NoteEvent) {
    match event.event_type {
        NoteEventKind::Created => handler.on_created(event).await,
        NoteEventKind::Updated => handler.on_updated(event).await,
        NoteEventKind::Deleted => handler.on_deleted(event).await,
        NoteEventKind::Toggled => handler.on_toggled(event).await,
    }
}

/// Logs every event it sees
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNoteEventHandler;

#[async_trait]
impl NoteEventHandler for LoggingNoteEventHandler {
    async fn on_created(&self, event: &NoteEvent) {
        info!(note_id = %event.note_id, title = ?event.title, "Note created");
    }

    async fn on_updated(&self, event: &NoteEvent) {
        info!(note_id = %event.note_id, title = ?event.title, "Note updated");
    }

    async fn on_deleted(&self, event: &NoteEvent) {
        info!(note_id = %event.note_id, "Note deleted");
    }

    async fn on_toggled(&self, event: &NoteEvent) {
        info!(note_id = %event.note_id, "Note completion toggled");
    }
}

/// Consumer group settings
#[derive(Debug, Clone)]
pub struct ConsumerSettings {
    pub topic: String,
    pub group: String,
    pub consumer_id: String,
    pub batch_size: usize,
    pub block_timeout: Duration,
}

impl ConsumerSettings {
    pub fn new(topic: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            group: group.into(),
            consumer_id: format!("consumer-{}", uuid::Uuid::new_v4()),
            batch_size: 32,
            block_timeout: Duration::from_secs(5),
        }
    }
}

/// Decode one stream entry
pub fn decode_entry(entry_id: &str, fields: &[(String, String)]) -> EventResult<NoteEvent> {
    let payload = fields
        .iter()
        .find(|(k, _)| k == "event")
        .map(|(_, v)| v.as_str())
        .ok_or_else(|| EventError::Malformed(format!("entry {entry_id} has no 'event' field")))?;

    Ok(serde_json::from_str(payload)?)
}

pub struct NoteEventConsumer<H: NoteEventHandler> {
    redis: Arc<ConnectionManager>,
    settings: ConsumerSettings,
    streams: Vec<String>,
    handler: H,
}

impl<H: NoteEventHandler> NoteEventConsumer<H> {
    pub fn new(redis: Arc<ConnectionManager>, settings: ConsumerSettings, handler: H) -> Self {
        let streams = NoteEventKind::iter()
            .map(|kind| partition_stream(&settings.topic, kind.as_ref()))
            .collect();

        Self {
            redis,
            settings,
            streams,
            handler,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Create the consumer group on every partition stream if missing
    pub async fn init_groups(&self) -> EventResult<()> {
        let mut conn = (*self.redis).clone();

        for stream in &self.streams {
            let result: RedisResult<()> = redis::cmd("XGROUP")
                .arg("CREATE")
                .arg(stream)
                .arg(&self.settings.group)
                .arg("$")
                .arg("MKSTREAM")
                .query_async(&mut conn)
                .await;

            match result {
                Ok(()) => info!(%stream, group = %self.settings.group, "Created consumer group"),
                Err(e) if e.to_string().contains("BUSYGROUP") => {
                    debug!(%stream, group = %self.settings.group, "Consumer group already exists")
                }
                Err(e) => return Err(EventError::Redis(e)),
            }
        }

        Ok(())
    }

    /// Read, dispatch and acknowledge one batch. Returns the number of entries seen.
    pub async fn poll_once(&self) -> EventResult<usize> {
        let mut conn = (*self.redis).clone();

        let mut cmd = redis::cmd("XREADGROUP");
        cmd.arg("GROUP")
            .arg(&self.settings.group)
            .arg(&self.settings.consumer_id)
            .arg("BLOCK")
            .arg(self.settings.block_timeout.as_millis() as u64)
            .arg("COUNT")
            .arg(self.settings.batch_size)
            .arg("STREAMS");
        for stream in &self.streams {
            cmd.arg(stream);
        }
        for _ in &self.streams {
            cmd.arg(">");
        }

        let reply: Option<StreamReply> = cmd.query_async(&mut conn).await?;
        let Some(reply) = reply else {
            return Ok(0);
        };

        let mut seen = 0;
        for (stream, entries) in reply {
            for (entry_id, fields) in entries {
                seen += 1;
                match decode_entry(&entry_id, &fields) {
                    Ok(event) => dispatch(&self.handler, &event).await,
                    Err(e) => warn!(%stream, %entry_id, error = %e, "Skipping undecodable note event"),
                }

                let _: i64 = redis::cmd("XACK")
                    .arg(&stream)
                    .arg(&self.settings.group)
                    .arg(&entry_id)
                    .query_async(&mut conn)
                    .await?;
            }
        }

        Ok(seen)
    }

    /// Poll until `shutdown` flips to `true`
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> EventResult<()> {
        self.init_groups().await?;
        info!(
            streams = ?self.streams,
            group = %self.settings.group,
            consumer = %self.settings.consumer_id,
            "Note event consumer started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = shutdown.changed() => break,
                result = self.poll_once() => {
                    if let Err(e) = result {
                        error!(error = %e, "Failed to read note events");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }

        info!("Note event consumer stopped");
        Ok(())
    }
}
