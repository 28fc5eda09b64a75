use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A persisted daily note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Calendar day the note belongs to
    pub date: NaiveDate,
    pub weight: f64,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Replace the user-editable fields, leaving `completed` untouched
    pub fn apply_update(&mut self, update: UpdateNote) {
        self.title = update.title;
        self.content = update.content;
        self.weight = update.weight;
        self.date = update.date;
    }

    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }
}

/// Input for creating a note. Has no id until the store assigns one.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewNote {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub content: String,
    #[serde(default)]
    pub weight: f64,
    /// Defaults to today when absent
    pub date: Option<NaiveDate>,
}

impl NewNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>, weight: f64) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            weight,
            date: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Full replacement of a note's editable fields
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateNote {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub content: String,
    #[serde(default)]
    pub weight: f64,
    pub date: NaiveDate,
}

/// Mutation applied to a locked note row
#[derive(Debug, Clone)]
pub enum NoteChange {
    Update(UpdateNote),
    ToggleCompletion,
}

impl NoteChange {
    pub fn apply(self, note: &mut Note) {
        match self {
            NoteChange::Update(update) => note.apply_update(update),
            NoteChange::ToggleCompletion => note.toggle_completed(),
        }
    }
}

/// A note after a [`NoteChange`], with the date it had before the change
#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedNote {
    pub previous_date: NaiveDate,
    pub note: Note,
}

/// Current calendar day in UTC
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}
