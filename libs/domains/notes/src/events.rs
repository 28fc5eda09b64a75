use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::models::Note;

/// What happened to a note
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum NoteEventKind {
    Created,
    Updated,
    Deleted,
    Toggled,
}

/// Notification emitted after a successful note mutation.
///
/// Serialized as a flat camelCase JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEvent {
    pub event_type: NoteEventKind,
    pub note_id: Uuid,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

impl NoteEvent {
    /// Snapshot of `note` at event time
    pub fn from_note(kind: NoteEventKind, note: &Note) -> Self {
        Self {
            event_type: kind,
            note_id: note.id,
            title: Some(note.title.clone()),
            content: Some(note.content.clone()),
            timestamp: Utc::now(),
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }
}
