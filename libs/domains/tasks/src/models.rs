use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Category of system-seeded default tasks
pub const TEMPLATE_CATEGORY: &str = "Template";

/// Category given to generated tasks that arrive without one
pub const AI_CATEGORY: &str = "AI";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Whether the category marks a template, ignoring case and surrounding whitespace
    pub fn is_template(&self) -> bool {
        self.category
            .trim()
            .to_lowercase()
            .contains(&TEMPLATE_CATEGORY.to_lowercase())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTask {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    pub category: String,
}

impl NewTask {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
        }
    }
}

/// One item of a generation response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedTask {
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl GeneratedTask {
    /// Convert to a [`NewTask`], defaulting a missing or blank category to [`AI_CATEGORY`]
    pub fn into_new_task(self) -> NewTask {
        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| AI_CATEGORY.to_string());
        NewTask::new(self.title, category)
    }
}

/// Case-insensitive lookup key for titles and categories
pub fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(category: &str) -> Task {
        Task {
            id: Uuid::now_v7(),
            title: "Morning workout".to_string(),
            category: category.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_template() {
        assert!(task("Template").is_template());
        assert!(task("  template ").is_template());
        assert!(task("Monthly TEMPLATE").is_template());
        assert!(!task("AI").is_template());
        assert!(!task("").is_template());
    }

    #[test]
    fn test_generated_task_defaults_category() {
        let missing: GeneratedTask = serde_json::from_str(r#"{"title":"Stretch"}"#).unwrap();
        assert_eq!(missing.into_new_task().category, "AI");

        let blank = GeneratedTask {
            title: "Stretch".to_string(),
            category: Some("  ".to_string()),
        };
        assert_eq!(blank.into_new_task().category, "AI");

        let given = GeneratedTask {
            title: "Stretch".to_string(),
            category: Some("Health".to_string()),
        };
        assert_eq!(given.into_new_task().category, "Health");
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Morning Workout "), "morning workout");
    }

    #[test]
    fn test_blank_title_rejected() {
        assert!(NewTask::new(" ", "Template").validate().is_err());
        assert!(NewTask::new("Read", "Template").validate().is_ok());
    }
}
