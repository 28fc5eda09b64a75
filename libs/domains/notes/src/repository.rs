use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::NoteResult;
use crate::models::{ModifiedNote, NewNote, Note, NoteChange};

/// Durable note store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note and return it with its assigned id
    async fn create(&self, input: NewNote) -> NoteResult<Note>;

    /// Apply `change` to the current row as one unit of work.
    ///
    /// The row is locked while it is read, changed and written, so concurrent
    /// changes to the same note serialize. Fails with `NotFound` when the row
    /// does not exist.
    async fn modify(&self, id: Uuid, change: NoteChange) -> NoteResult<ModifiedNote>;

    async fn find_by_id(&self, id: Uuid) -> NoteResult<Option<Note>>;

    /// Notes on `date`, oldest first
    async fn find_by_date(&self, date: NaiveDate) -> NoteResult<Vec<Note>>;

    /// Returns `false` when nothing was deleted
    async fn delete_by_id(&self, id: Uuid) -> NoteResult<bool>;

    async fn exists_by_id(&self, id: Uuid) -> NoteResult<bool>;
}
