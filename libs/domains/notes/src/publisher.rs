//! Fire-and-forget note event publication.
//!
//! [`NoteEventPublisher::publish`] only enqueues; a background delivery loop
//! hands each event to the [`EventBus`] and logs the outcome. Nothing is
//! reported back to the caller and nothing is retried.
//!
//! ```rust,ignore
//! let bus = RedisEventBus::new(redis, config.max_stream_length);
//! let (publisher, _delivery) = NoteEventPublisher::spawn(bus, &config);
//! publisher.publish_event(NoteEvent::from_note(NoteEventKind::Created, &note))?;
//! ```

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::NoteEventsConfig;
use crate::error::{EventError, EventResult};
use crate::events::NoteEvent;

/// Where a delivered event ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub partition: String,
    pub offset: String,
}

/// Message bus transport
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventBus: Send + Sync + 'static {
    /// Deliver one event to `topic`, routed by `key`
    async fn send(&self, topic: &str, key: &str, event: &NoteEvent)
    -> EventResult<DeliveryReceipt>;
}

/// Stream that holds every event routed by `key`
pub fn partition_stream(topic: &str, key: &str) -> String {
    format!("{topic}:{key}")
}

/// Redis Streams [`EventBus`].
///
/// Each routing key maps to its own stream, so events of one kind stay
/// ordered among themselves. The returned offset is the stream entry id.
#[derive(Clone)]
pub struct RedisEventBus {
    redis: Arc<ConnectionManager>,
    max_length: i64,
}

impl RedisEventBus {
    pub fn new(redis: ConnectionManager, max_length: i64) -> Self {
        Self {
            redis: Arc::new(redis),
            max_length,
        }
    }

    pub fn from_arc(redis: Arc<ConnectionManager>, max_length: i64) -> Self {
        Self { redis, max_length }
    }
}

#[async_trait]
impl EventBus for RedisEventBus {
    async fn send(
        &self,
        topic: &str,
        key: &str,
        event: &NoteEvent,
    ) -> EventResult<DeliveryReceipt> {
        let mut conn = (*self.redis).clone();
        let stream = partition_stream(topic, key);
        let payload = serde_json::to_string(event)?;

        let entry_id: String = redis::cmd("XADD")
            .arg(&stream)
            .arg("MAXLEN")
            .arg("~")
            .arg(self.max_length)
            .arg("*")
            .arg("key")
            .arg(key)
            .arg("event")
            .arg(&payload)
            .query_async(&mut conn)
            .await?;

        Ok(DeliveryReceipt {
            partition: stream,
            offset: entry_id,
        })
    }
}

/// One queued publish request
#[derive(Debug, Clone)]
pub struct OutboundEvent {
    pub topic: String,
    pub key: String,
    pub event: NoteEvent,
}

/// Non-blocking handle for submitting note events
#[derive(Clone)]
pub struct NoteEventPublisher {
    tx: mpsc::Sender<OutboundEvent>,
    topic: String,
}

impl NoteEventPublisher {
    /// Publisher plus the receiving end of its queue, for callers that drive delivery themselves
    pub fn channel(config: &NoteEventsConfig) -> (Self, mpsc::Receiver<OutboundEvent>) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        (
            Self {
                tx,
                topic: config.topic.clone(),
            },
            rx,
        )
    }

    /// Publisher whose queue is drained by a spawned delivery loop over `bus`.
    ///
    /// The loop exits once every publisher clone has been dropped.
    pub fn spawn<B: EventBus>(bus: B, config: &NoteEventsConfig) -> (Self, JoinHandle<()>) {
        let (publisher, rx) = Self::channel(config);
        let handle = tokio::spawn(run_delivery_loop(Arc::new(bus), rx));
        (publisher, handle)
    }

    /// Queue `event` for delivery and return immediately.
    ///
    /// Errors only when the queue is full or the delivery loop is gone; the
    /// delivery outcome itself is never reported here.
    pub fn publish(&self, topic: &str, key: &str, event: NoteEvent) -> EventResult<()> {
        let outbound = OutboundEvent {
            topic: topic.to_string(),
            key: key.to_string(),
            event,
        };

        self.tx.try_send(outbound).map_err(|e| match e {
            TrySendError::Full(_) => EventError::QueueFull,
            TrySendError::Closed(_) => EventError::QueueClosed,
        })
    }

    /// [`publish`](Self::publish) to the configured topic, keyed by event kind
    pub fn publish_event(&self, event: NoteEvent) -> EventResult<()> {
        let key = event.event_type.as_ref().to_string();
        let topic = self.topic.clone();
        self.publish(&topic, &key, event)
    }
}

/// Drain `rx`, delivering events one at a time and logging each outcome
pub async fn run_delivery_loop<B: EventBus + ?Sized>(
    bus: Arc<B>,
    mut rx: mpsc::Receiver<OutboundEvent>,
) {
    info!("Note event delivery loop started");

    while let Some(outbound) = rx.recv().await {
        deliver(bus.as_ref(), outbound).await;
    }

    info!("Note event delivery loop stopped");
}

async fn deliver<B: EventBus + ?Sized>(bus: &B, outbound: OutboundEvent) {
    let OutboundEvent { topic, key, event } = outbound;

    match bus.send(&topic, &key, &event).await {
        Ok(receipt) => {
            info!(
                topic = %topic,
                key = %key,
                note_id = %event.note_id,
                partition = %receipt.partition,
                offset = %receipt.offset,
                "Delivered note event"
            );
        }
        Err(e) => {
            error!(
                topic = %topic,
                key = %key,
                note_id = %event.note_id,
                error = %e,
                "Failed to deliver note event"
            );
        }
    }
}
