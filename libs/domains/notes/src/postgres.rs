use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::entity;
use crate::error::{NoteError, NoteResult};
use crate::models::{ModifiedNote, NewNote, Note, NoteChange};
use crate::repository::NoteRepository;

pub struct PgNoteRepository {
    db: DatabaseConnection,
}

impl PgNoteRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn create(&self, input: NewNote) -> NoteResult<Note> {
        let active_model: entity::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await?;

        info!(note_id = %model.id, date = %model.date, "Created note");
        Ok(model.into())
    }

    async fn modify(&self, id: Uuid, change: NoteChange) -> NoteResult<ModifiedNote> {
        let txn = self.db.begin().await?;

        // Dropping `txn` on an early return rolls it back
        let existing = entity::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(NoteError::NotFound(id))?;

        let previous_date = existing.date;
        let mut note: Note = existing.clone().into();
        change.apply(&mut note);

        let mut active_model: entity::ActiveModel = existing.into();
        active_model.title = Set(note.title);
        active_model.content = Set(note.content);
        active_model.date = Set(note.date);
        active_model.weight = Set(note.weight);
        active_model.completed = Set(note.completed);
        active_model.updated_at = Set(chrono::Utc::now().into());

        let model = active_model.update(&txn).await?;
        txn.commit().await?;

        info!(note_id = %model.id, %previous_date, date = %model.date, "Modified note");
        Ok(ModifiedNote {
            previous_date,
            note: model.into(),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> NoteResult<Option<Note>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_date(&self, date: NaiveDate) -> NoteResult<Vec<Note>> {
        let models = entity::Entity::find()
            .filter(entity::Column::Date.eq(date))
            .order_by_asc(entity::Column::CreatedAt)
            .all(&self.db)
            .await?;

        debug!(%date, count = models.len(), "Loaded notes for date");
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn delete_by_id(&self, id: Uuid) -> NoteResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            info!(note_id = %id, "Deleted note");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn exists_by_id(&self, id: Uuid) -> NoteResult<bool> {
        let count = entity::Entity::find_by_id(id).count(&self.db).await?;
        Ok(count > 0)
    }
}
