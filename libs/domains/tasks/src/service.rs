use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{TaskError, TaskResult};
use crate::generation::{GenerationClient, GenerationOutcome};
use crate::models::{NewTask, Task};
use crate::repository::TaskRepository;
use crate::templates::{CATALOG_VERSION, DEFAULT_TEMPLATES};

/// Task catalogue queries
pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
}

impl<R: TaskRepository> Clone for TaskService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self))]
    pub async fn create_task(&self, title: &str, category: &str) -> TaskResult<Task> {
        let input = NewTask::new(title, category);
        input
            .validate()
            .map_err(|e| TaskError::Validation(e.to_string()))?;

        self.repository.create(input).await
    }

    pub async fn list_tasks(&self) -> TaskResult<Vec<Task>> {
        self.repository.list().await
    }

    /// Tasks whose category marks them as templates, for month auto-fill
    pub async fn template_tasks(&self) -> TaskResult<Vec<Task>> {
        let tasks = self.repository.list().await?;
        Ok(tasks.into_iter().filter(Task::is_template).collect())
    }

    pub async fn template_task_ids(&self) -> TaskResult<Vec<Uuid>> {
        let tasks = self.template_tasks().await?;
        Ok(tasks.into_iter().map(|t| t.id).collect())
    }
}

/// Produces task sets for plan auto-fill.
///
/// Template tasks are deduplicated by `(title, category)`; generated tasks
/// are stored as new rows on every call.
pub struct TaskTemplateService<R: TaskRepository, G: GenerationClient> {
    repository: Arc<R>,
    generator: Arc<G>,
}

impl<R: TaskRepository, G: GenerationClient> Clone for TaskTemplateService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            generator: self.generator.clone(),
        }
    }
}

impl<R: TaskRepository, G: GenerationClient> TaskTemplateService<R, G> {
    pub fn new(repository: R, generator: G) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
        }
    }

    /// Return the task for `(title, category)`, creating it on first use
    #[instrument(skip(self))]
    pub async fn ensure_template_task_exists(&self, title: &str, category: &str) -> TaskResult<Task> {
        let input = NewTask::new(title, category);
        input
            .validate()
            .map_err(|e| TaskError::Validation(e.to_string()))?;

        if let Some(existing) = self
            .repository
            .find_by_title_and_category(title, category)
            .await?
        {
            debug!(task_id = %existing.id, "Template task already present");
            return Ok(existing);
        }

        self.repository.create_template(input).await
    }

    /// Ensure every entry of the default catalogue and return them in catalogue order
    #[instrument(skip(self), fields(catalog_version = CATALOG_VERSION))]
    pub async fn generate_default_tasks(&self) -> TaskResult<Vec<Task>> {
        let mut tasks = Vec::with_capacity(DEFAULT_TEMPLATES.len());
        for (title, category) in DEFAULT_TEMPLATES {
            tasks.push(self.ensure_template_task_exists(title, category).await?);
        }

        info!(count = tasks.len(), "Default tasks ready");
        Ok(tasks)
    }

    /// Generate tasks from `prompt`, falling back to the default catalogue on any generation failure
    #[instrument(skip(self, prompt))]
    pub async fn generate_from_prompt(&self, prompt: &str) -> TaskResult<Vec<Task>> {
        let generated = match self.generator.generate(prompt).await {
            Ok(items) => items,
            Err(failure) => {
                warn!(
                    outcome = %failure.outcome(),
                    error = %failure,
                    "Generation failed, using default tasks"
                );
                let tasks = self.generate_default_tasks().await?;
                info!(
                    outcome = %GenerationOutcome::FallbackProduced,
                    count = tasks.len(),
                    "Returning default tasks"
                );
                return Ok(tasks);
            }
        };

        let mut tasks = Vec::with_capacity(generated.len());
        for item in generated {
            tasks.push(self.repository.create(item.into_new_task()).await?);
        }

        info!(
            outcome = %GenerationOutcome::Succeeded,
            count = tasks.len(),
            "Generated tasks stored"
        );
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{GenerationFailure, MockGenerationClient};
    use crate::models::{GeneratedTask, TEMPLATE_CATEGORY, normalize_key};
    use crate::repository::MockTaskRepository;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    fn stored(input: &NewTask) -> Task {
        Task {
            id: Uuid::now_v7(),
            title: input.title.clone(),
            category: input.category.clone(),
            created_at: Utc::now(),
        }
    }

    /// Repository mock backed by a key map so template lookups see earlier inserts
    fn keyed_repository() -> (MockTaskRepository, Arc<Mutex<HashMap<(String, String), Task>>>) {
        let rows: Arc<Mutex<HashMap<(String, String), Task>>> = Arc::default();
        let mut repo = MockTaskRepository::new();

        let reader = rows.clone();
        repo.expect_find_by_title_and_category()
            .returning(move |title, category| {
                let key = (normalize_key(title), normalize_key(category));
                Ok(reader.lock().unwrap().get(&key).cloned())
            });

        let writer = rows.clone();
        repo.expect_create_template().returning(move |input| {
            let task = stored(&input);
            let key = (normalize_key(&input.title), normalize_key(&input.category));
            writer.lock().unwrap().insert(key, task.clone());
            Ok(task)
        });

        (repo, rows)
    }

    fn titles(tasks: &[Task]) -> Vec<(String, String)> {
        tasks
            .iter()
            .map(|t| (t.title.clone(), t.category.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_ensure_template_returns_existing_without_writing() {
        let existing = Task {
            id: Uuid::now_v7(),
            title: "Morning workout".to_string(),
            category: "Template".to_string(),
            created_at: Utc::now(),
        };

        let mut repo = MockTaskRepository::new();
        let found = existing.clone();
        repo.expect_find_by_title_and_category()
            .withf(|title, category| title == "MORNING WORKOUT" && category == "template")
            .times(1)
            .returning(move |_, _| Ok(Some(found.clone())));
        repo.expect_create_template().never();

        let service = TaskTemplateService::new(repo, MockGenerationClient::new());
        let task = service
            .ensure_template_task_exists("MORNING WORKOUT", "template")
            .await
            .unwrap();

        assert_eq!(task, existing);
    }

    #[tokio::test]
    async fn test_ensure_template_twice_yields_one_row() {
        let (repo, rows) = keyed_repository();
        let service = TaskTemplateService::new(repo, MockGenerationClient::new());

        let first = service
            .ensure_template_task_exists("Read a technical article", "Template")
            .await
            .unwrap();
        let second = service
            .ensure_template_task_exists("read a technical article", "TEMPLATE")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_template_rejects_blank_title() {
        let mut repo = MockTaskRepository::new();
        repo.expect_find_by_title_and_category().never();

        let service = TaskTemplateService::new(repo, MockGenerationClient::new());
        let result = service.ensure_template_task_exists("  ", "Template").await;

        assert!(matches!(result, Err(TaskError::Validation(_))));
    }

    #[tokio::test]
    async fn test_default_tasks_are_stable() {
        let (repo, rows) = keyed_repository();
        let service = TaskTemplateService::new(repo, MockGenerationClient::new());

        let first = service.generate_default_tasks().await.unwrap();
        let second = service.generate_default_tasks().await.unwrap();

        assert_eq!(first.len(), 3);
        assert!(first.iter().all(|t| t.category == TEMPLATE_CATEGORY));
        assert_eq!(
            first.iter().map(|t| t.id).collect::<Vec<_>>(),
            second.iter().map(|t| t.id).collect::<Vec<_>>()
        );
        assert_eq!(rows.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_default_tasks_propagate_persistence_error() {
        let mut repo = MockTaskRepository::new();
        repo.expect_find_by_title_and_category()
            .returning(|_, _| Err(TaskError::Persistence("pool timed out".to_string())));

        let service = TaskTemplateService::new(repo, MockGenerationClient::new());
        let result = service.generate_default_tasks().await;

        assert!(matches!(result, Err(TaskError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_generation_failures_fall_back_to_defaults() {
        let failures = [
            GenerationFailure::TimedOut(Duration::from_secs(30)),
            GenerationFailure::ServerError(500),
            GenerationFailure::EmptyResponse,
            GenerationFailure::MalformedResponse("expected a list".to_string()),
            GenerationFailure::Transport("connection refused".to_string()),
        ];

        for failure in failures {
            let (mut repo, _rows) = keyed_repository();
            repo.expect_create().never();

            let mut generator = MockGenerationClient::new();
            let mut failure = Some(failure);
            generator
                .expect_generate()
                .times(1)
                .returning(move |_| Err(failure.take().unwrap()));

            let service = TaskTemplateService::new(repo, generator);
            let fallback = service.generate_from_prompt("plan my week").await.unwrap();
            let defaults = service.generate_default_tasks().await.unwrap();

            assert_eq!(titles(&fallback), titles(&defaults));
            assert_eq!(fallback.len(), 3);
        }
    }

    #[tokio::test]
    async fn test_generated_tasks_are_stored_without_dedup() {
        let mut repo = MockTaskRepository::new();
        repo.expect_find_by_title_and_category().never();
        repo.expect_create_template().never();
        repo.expect_create()
            .times(4)
            .returning(|input| Ok(stored(&input)));

        let mut generator = MockGenerationClient::new();
        generator
            .expect_generate()
            .withf(|prompt| prompt == "plan my week")
            .times(2)
            .returning(|_| {
                Ok(vec![
                    GeneratedTask {
                        title: "Stretch".to_string(),
                        category: None,
                    },
                    GeneratedTask {
                        title: "Call mom".to_string(),
                        category: Some("Family".to_string()),
                    },
                ])
            });

        let service = TaskTemplateService::new(repo, generator);

        let first = service.generate_from_prompt("plan my week").await.unwrap();
        let second = service.generate_from_prompt("plan my week").await.unwrap();

        assert_eq!(
            titles(&first),
            vec![
                ("Stretch".to_string(), "AI".to_string()),
                ("Call mom".to_string(), "Family".to_string()),
            ]
        );
        assert_ne!(first[0].id, second[0].id);
    }

    #[tokio::test]
    async fn test_template_queries() {
        let tasks = vec![
            stored(&NewTask::new("Morning workout", "Template")),
            stored(&NewTask::new("Stretch", "AI")),
            stored(&NewTask::new("Read", " monthly template ")),
        ];
        let expected_ids = vec![tasks[0].id, tasks[2].id];

        let mut repo = MockTaskRepository::new();
        repo.expect_list().returning(move || Ok(tasks.clone()));

        let service = TaskService::new(repo);

        assert_eq!(service.list_tasks().await.unwrap().len(), 3);
        assert_eq!(service.template_tasks().await.unwrap().len(), 2);
        assert_eq!(service.template_task_ids().await.unwrap(), expected_ids);
    }

    #[tokio::test]
    async fn test_create_task_validates_title() {
        let mut repo = MockTaskRepository::new();
        repo.expect_create()
            .withf(|input| input.title == "Stretch" && input.category == "Health")
            .times(1)
            .returning(|input| Ok(stored(&input)));

        let service = TaskService::new(repo);

        assert!(service.create_task("Stretch", "Health").await.is_ok());
        assert!(matches!(
            service.create_task("", "Health").await,
            Err(TaskError::Validation(_))
        ));
    }
}
