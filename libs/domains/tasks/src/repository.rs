use async_trait::async_trait;

use crate::error::TaskResult;
use crate::models::{NewTask, Task};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a task; no deduplication
    async fn create(&self, input: NewTask) -> TaskResult<Task>;

    /// Insert a template task, or return the row another caller seeded first
    async fn create_template(&self, input: NewTask) -> TaskResult<Task>;

    /// Oldest task matching `(title, category)` ignoring case and surrounding whitespace
    async fn find_by_title_and_category(
        &self,
        title: &str,
        category: &str,
    ) -> TaskResult<Option<Task>>;

    /// All tasks, oldest first
    async fn list(&self) -> TaskResult<Vec<Task>>;
}
