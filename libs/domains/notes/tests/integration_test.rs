//! Integration tests against real PostgreSQL and Redis containers.

use async_trait::async_trait;
use chrono::NaiveDate;
use domain_notes::cache::cache_key;
use domain_notes::consumer::{ConsumerSettings, NoteEventConsumer, NoteEventHandler};
use domain_notes::{
    CacheName, CacheStore, EventBus, NewNote, NoteChange, NoteError, NoteEvent, NoteEventKind,
    NoteEventPublisher, NoteEventsConfig, NoteRepository, NoteService, PgNoteRepository,
    RedisCacheStore, RedisEventBus, UpdateNote,
};
use redis::AsyncCommands;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use test_utils::{TestDataBuilder, TestDatabase, TestRedis};
use uuid::Uuid;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

#[tokio::test]
async fn test_repository_crud() {
    let db = TestDatabase::new().await;
    let repo = PgNoteRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("test_repository_crud");
    let day = builder.date();

    let note = repo
        .create(NewNote::new(builder.name("note", "main"), "content", 1.5).on(day))
        .await
        .unwrap();
    assert!(!note.completed);
    assert_eq!(note.date, day);

    let found = repo.find_by_id(note.id).await.unwrap().unwrap();
    assert_eq!(found.id, note.id);
    assert_eq!(found.title, note.title);

    let toggled = repo
        .modify(note.id, NoteChange::ToggleCompletion)
        .await
        .unwrap();
    assert_eq!(toggled.previous_date, day);
    assert!(toggled.note.completed);

    let updated = repo
        .modify(
            note.id,
            NoteChange::Update(UpdateNote {
                title: note.title.clone(),
                content: "changed".to_string(),
                weight: 3.0,
                date: day,
            }),
        )
        .await
        .unwrap();
    assert_eq!(updated.note.weight, 3.0);
    assert!(updated.note.completed);

    let on_day = repo.find_by_date(day).await.unwrap();
    assert_eq!(on_day.len(), 1);

    assert!(repo.exists_by_id(note.id).await.unwrap());
    assert!(repo.delete_by_id(note.id).await.unwrap());
    assert!(!repo.delete_by_id(note.id).await.unwrap());
    assert!(!repo.exists_by_id(note.id).await.unwrap());
}

#[tokio::test]
async fn test_modify_missing_note_is_not_found() {
    let db = TestDatabase::new().await;
    let repo = PgNoteRepository::new(db.connection());

    let note = repo
        .create(NewNote::new("Groceries", "milk", 1.0).on(date(1)))
        .await
        .unwrap();
    repo.delete_by_id(note.id).await.unwrap();

    let result = repo.modify(note.id, NoteChange::ToggleCompletion).await;
    assert!(matches!(result, Err(NoteError::NotFound(id)) if id == note.id));
}

#[tokio::test]
async fn test_concurrent_toggles_serialize_on_the_row() {
    let db = TestDatabase::new().await;
    let repo = Arc::new(PgNoteRepository::new(db.connection()));

    let note = repo
        .create(NewNote::new("Groceries", "milk", 1.0).on(date(1)))
        .await
        .unwrap();

    let id = note.id;
    let mut handles = Vec::new();
    for _ in 0..8 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.modify(id, NoteChange::ToggleCompletion).await
        }));
    }

    let mut completed = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().note.completed {
            completed += 1;
        }
    }

    // Every flip lands: half the toggles saw false, half saw true
    assert_eq!(completed, 4);
    let stored = repo.find_by_id(note.id).await.unwrap().unwrap();
    assert!(!stored.completed);
}

#[tokio::test]
async fn test_update_reports_date_from_locked_row() {
    let db = TestDatabase::new().await;
    let repo = PgNoteRepository::new(db.connection());

    let note = repo
        .create(NewNote::new("Groceries", "milk", 1.0).on(date(1)))
        .await
        .unwrap();
    let move_to = |day| {
        NoteChange::Update(UpdateNote {
            title: "Groceries".to_string(),
            content: "milk".to_string(),
            weight: 1.0,
            date: date(day),
        })
    };

    repo.modify(note.id, move_to(2)).await.unwrap();
    let second = repo.modify(note.id, move_to(3)).await.unwrap();

    assert_eq!(second.previous_date, date(2));
    assert_eq!(second.note.date, date(3));
}

#[tokio::test]
async fn test_redis_cache_clear_only_touches_one_cache() {
    let redis = TestRedis::new().await;
    let store = RedisCacheStore::new(redis.connection());
    let ttl = Duration::from_secs(60);

    store.put(CacheName::NotesByDate, "2025-03-01", "[]", ttl).await.unwrap();
    store.put(CacheName::NotesByDate, "2025-03-02", "[]", ttl).await.unwrap();
    store.put(CacheName::NotesById, "abc", "{}", ttl).await.unwrap();

    store.clear(CacheName::NotesByDate).await.unwrap();

    assert!(store.get(CacheName::NotesByDate, "2025-03-01").await.unwrap().is_none());
    assert!(store.get(CacheName::NotesByDate, "2025-03-02").await.unwrap().is_none());
    assert_eq!(
        store.get(CacheName::NotesById, "abc").await.unwrap().as_deref(),
        Some("{}")
    );

    // Evicting an absent key is a no-op
    store.evict(CacheName::NotesById, "missing").await.unwrap();
}

#[tokio::test]
async fn test_pipeline_against_real_backends() {
    let db = TestDatabase::new().await;
    let redis = TestRedis::new().await;

    let config = NoteEventsConfig::default();
    let bus = RedisEventBus::new(redis.connection(), config.max_stream_length);
    let (publisher, _delivery) = NoteEventPublisher::spawn(bus, &config);

    let service = NoteService::new(
        PgNoteRepository::new(db.connection()),
        RedisCacheStore::new(redis.connection()),
        publisher,
    );

    let note = service
        .create_note(NewNote::new("Groceries", "milk", 1.0).on(date(1)))
        .await
        .unwrap();

    let notes = service.find_notes_by_date(date(1)).await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, note.id);

    assert!(
        redis
            .has_key(&cache_key(CacheName::NotesByDate, "2025-03-01"))
            .await
    );

    service
        .update_note(
            note.id,
            UpdateNote {
                title: "Groceries".to_string(),
                content: "milk, eggs".to_string(),
                weight: 1.0,
                date: date(2),
            },
        )
        .await
        .unwrap();

    assert!(
        !redis
            .has_key(&cache_key(CacheName::NotesByDate, "2025-03-01"))
            .await,
        "old date bucket must be evicted"
    );
    assert!(service.find_notes_by_date(date(1)).await.unwrap().is_empty());
    assert_eq!(service.find_notes_by_date(date(2)).await.unwrap().len(), 1);

    service.delete_note(note.id).await.unwrap();
    assert!(matches!(
        service.find_note_by_id(note.id).await,
        Err(NoteError::NotFound(_))
    ));

    assert_eq!(redis.wait_for_stream_len("note-events:CREATED", 1).await, 1);
    assert_eq!(redis.wait_for_stream_len("note-events:UPDATED", 1).await, 1);
    assert_eq!(redis.wait_for_stream_len("note-events:DELETED", 1).await, 1);
}

type Seen = (NoteEventKind, Uuid, Option<Uuid>);

#[derive(Default)]
struct CollectingHandler {
    seen: Mutex<Vec<Seen>>,
}

impl CollectingHandler {
    fn record(&self, event: &NoteEvent) {
        self.seen
            .lock()
            .unwrap()
            .push((event.event_type, event.note_id, event.user_id));
    }
}

#[async_trait]
impl NoteEventHandler for CollectingHandler {
    async fn on_created(&self, event: &NoteEvent) {
        self.record(event);
    }
    async fn on_updated(&self, event: &NoteEvent) {
        self.record(event);
    }
    async fn on_deleted(&self, event: &NoteEvent) {
        self.record(event);
    }
    async fn on_toggled(&self, event: &NoteEvent) {
        self.record(event);
    }
}

#[tokio::test]
async fn test_consumer_reads_every_partition() {
    let redis = TestRedis::new().await;
    let manager = Arc::new(redis.connection());

    let mut settings = ConsumerSettings::new("note-events", "integration");
    settings.block_timeout = Duration::from_millis(200);
    let consumer = NoteEventConsumer::new(manager.clone(), settings, CollectingHandler::default());
    consumer.init_groups().await.unwrap();

    let bus = RedisEventBus::from_arc(manager, 1000);
    let user_id = TestDataBuilder::from_test_name("test_consumer_reads_every_partition").user_id();
    let note_id = Uuid::now_v7();
    for kind in [NoteEventKind::Created, NoteEventKind::Toggled] {
        let event = NoteEvent {
            event_type: kind,
            note_id,
            title: Some("Groceries".to_string()),
            content: None,
            timestamp: chrono::Utc::now(),
            user_id: None,
        }
        .with_user(user_id);
        let receipt = bus.send("note-events", kind.as_ref(), &event).await.unwrap();
        assert_eq!(receipt.partition, format!("note-events:{}", kind.as_ref()));
    }

    let mut conn = redis.connection();
    let _: String = conn
        .xadd("note-events:UPDATED", "*", &[("event", "{broken")])
        .await
        .unwrap();

    let mut total = 0;
    for _ in 0..5 {
        total += consumer.poll_once().await.unwrap();
        if total >= 3 {
            break;
        }
    }

    assert_eq!(total, 3);
    let seen = consumer_seen(&consumer);
    assert_eq!(seen.len(), 2);
    assert!(seen.contains(&(NoteEventKind::Created, note_id, Some(user_id))));
    assert!(seen.contains(&(NoteEventKind::Toggled, note_id, Some(user_id))));
}

fn consumer_seen(consumer: &NoteEventConsumer<CollectingHandler>) -> Vec<Seen> {
    consumer.handler().seen.lock().unwrap().clone()
}
