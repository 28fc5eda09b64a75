use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::cache::{CacheName, CacheStore, NoteCacheService};
use crate::config::NoteCacheConfig;
use crate::error::{NoteError, NoteResult};
use crate::events::{NoteEvent, NoteEventKind};
use crate::models::{ModifiedNote, NewNote, Note, NoteChange, UpdateNote, today};
use crate::publisher::NoteEventPublisher;
use crate::repository::NoteRepository;

/// Orchestrates note mutations.
///
/// Every mutation runs store write, then cache eviction, then event
/// submission. Store and validation errors abort before any side effect.
/// Eviction completes before the call returns; event delivery never blocks
/// the call and its failure is only logged.
///
/// `delete_note` is the exception to that order: the DELETED event is
/// submitted before the row is removed, since the snapshot cannot be read
/// back afterwards. If the removal then fails the event is not retracted.
pub struct NoteService<R: NoteRepository, C: CacheStore> {
    repository: Arc<R>,
    store: Arc<C>,
    cache: NoteCacheService<C>,
    publisher: NoteEventPublisher,
    cache_ttl: Duration,
}

impl<R: NoteRepository, C: CacheStore> Clone for NoteService<R, C> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            store: self.store.clone(),
            cache: self.cache.clone(),
            publisher: self.publisher.clone(),
            cache_ttl: self.cache_ttl,
        }
    }
}

impl<R: NoteRepository, C: CacheStore> NoteService<R, C> {
    pub fn new(repository: R, cache_store: C, publisher: NoteEventPublisher) -> Self {
        let store = Arc::new(cache_store);
        Self {
            repository: Arc::new(repository),
            cache: NoteCacheService::new(store.clone()),
            store,
            publisher,
            cache_ttl: NoteCacheConfig::default().ttl,
        }
    }

    pub fn with_cache_config(mut self, config: &NoteCacheConfig) -> Self {
        self.cache_ttl = config.ttl;
        self
    }

    /// Create a note, defaulting its date to today
    #[instrument(skip(self, input), fields(note_title = %input.title))]
    pub async fn create_note(&self, mut input: NewNote) -> NoteResult<Note> {
        input
            .validate()
            .map_err(|e| NoteError::Validation(e.to_string()))?;
        input.date.get_or_insert_with(today);

        let note = self.repository.create(input).await?;

        self.cache.evict_by_date(Some(note.date)).await;
        self.cache.evict_by_id(note.id).await;

        self.publish_best_effort(NoteEvent::from_note(NoteEventKind::Created, &note));
        Ok(note)
    }

    /// Replace a note's fields; both the old and the new date buckets are evicted
    #[instrument(skip(self, input), fields(note_id = %id))]
    pub async fn update_note(&self, id: Uuid, input: UpdateNote) -> NoteResult<Note> {
        input
            .validate()
            .map_err(|e| NoteError::Validation(e.to_string()))?;

        let ModifiedNote {
            previous_date,
            note,
        } = self.repository.modify(id, NoteChange::Update(input)).await?;

        self.cache.evict_by_id(id).await;
        self.cache
            .evict_by_dates(&[Some(previous_date), Some(note.date)])
            .await;

        self.publish_best_effort(NoteEvent::from_note(NoteEventKind::Updated, &note));
        Ok(note)
    }

    #[instrument(skip(self), fields(note_id = %id))]
    pub async fn toggle_note_completion(&self, id: Uuid) -> NoteResult<Note> {
        let ModifiedNote { note, .. } = self
            .repository
            .modify(id, NoteChange::ToggleCompletion)
            .await?;

        self.cache.evict_by_id(id).await;
        self.cache.evict_by_date(Some(note.date)).await;

        self.publish_best_effort(NoteEvent::from_note(NoteEventKind::Toggled, &note));
        Ok(note)
    }

    #[instrument(skip(self), fields(note_id = %id))]
    pub async fn delete_note(&self, id: Uuid) -> NoteResult<()> {
        let note = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(NoteError::NotFound(id))?;

        // Submitted while the snapshot is still readable
        self.publish_best_effort(NoteEvent::from_note(NoteEventKind::Deleted, &note));

        if !self.repository.delete_by_id(id).await? {
            return Err(NoteError::NotFound(id));
        }

        self.cache.evict_by_id(id).await;
        self.cache.evict_by_date(Some(note.date)).await;
        Ok(())
    }

    /// Cache-aside read of a single note
    #[instrument(skip(self), fields(note_id = %id))]
    pub async fn find_note_by_id(&self, id: Uuid) -> NoteResult<Note> {
        let key = id.to_string();
        if let Some(note) = self.cached(CacheName::NotesById, &key).await {
            return Ok(note);
        }

        let note = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(NoteError::NotFound(id))?;

        self.fill(CacheName::NotesById, &key, &note).await;
        Ok(note)
    }

    /// Cache-aside read of a date bucket
    #[instrument(skip(self))]
    pub async fn find_notes_by_date(&self, date: NaiveDate) -> NoteResult<Vec<Note>> {
        let key = date.to_string();
        if let Some(notes) = self.cached(CacheName::NotesByDate, &key).await {
            return Ok(notes);
        }

        let notes = self.repository.find_by_date(date).await?;

        self.fill(CacheName::NotesByDate, &key, &notes).await;
        Ok(notes)
    }

    pub async fn note_exists(&self, id: Uuid) -> NoteResult<bool> {
        self.repository.exists_by_id(id).await
    }

    fn publish_best_effort(&self, event: NoteEvent) {
        let kind = event.event_type;
        let note_id = event.note_id;

        if let Err(e) = self.publisher.publish_event(event) {
            warn!(%kind, %note_id, error = %e, "Note event dropped");
        }
    }

    async fn cached<T: DeserializeOwned>(&self, cache: CacheName, key: &str) -> Option<T> {
        match self.store.get(cache, key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(%cache, key, "Cache hit");
                    Some(value)
                }
                Err(e) => {
                    warn!(%cache, key, error = %e, "Discarding unreadable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(%cache, key, error = %e, "Cache read failed, using store");
                None
            }
        }
    }

    async fn fill<T: Serialize + ?Sized>(&self, cache: CacheName, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(%cache, key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };

        if let Err(e) = self.store.put(cache, key, &raw, self.cache_ttl).await {
            warn!(%cache, key, error = %e, "Cache write failed");
        }
    }
}
