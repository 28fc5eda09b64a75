use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    SqlErr,
};
use tracing::{debug, info};

use crate::entity;
use crate::error::{TaskError, TaskResult};
use crate::models::{NewTask, Task, normalize_key};
use crate::repository::TaskRepository;

pub struct PgTaskRepository {
    db: DatabaseConnection,
}

impl PgTaskRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_by_keys(
        &self,
        title: &str,
        category: &str,
        seeded_only: bool,
    ) -> TaskResult<Option<Task>> {
        let mut query = entity::Entity::find()
            .filter(entity::Column::TitleKey.eq(normalize_key(title)))
            .filter(entity::Column::CategoryKey.eq(normalize_key(category)));

        if seeded_only {
            query = query.filter(entity::Column::Seeded.eq(true));
        }

        let model = query
            .order_by_asc(entity::Column::CreatedAt)
            .one(&self.db)
            .await?;

        Ok(model.map(Into::into))
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, input: NewTask) -> TaskResult<Task> {
        let model = entity::ActiveModel::from_new(input, false)
            .insert(&self.db)
            .await?;

        info!(task_id = %model.id, category = %model.category, "Created task");
        Ok(model.into())
    }

    async fn create_template(&self, input: NewTask) -> TaskResult<Task> {
        let title = input.title.clone();
        let category = input.category.clone();

        match entity::ActiveModel::from_new(input, true)
            .insert(&self.db)
            .await
        {
            Ok(model) => {
                info!(task_id = %model.id, title = %model.title, "Seeded template task");
                Ok(model.into())
            }
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                debug!(%title, %category, "Template task seeded concurrently, reusing it");
                self.find_by_keys(&title, &category, true)
                    .await?
                    .ok_or_else(|| TaskError::Persistence(err.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_title_and_category(
        &self,
        title: &str,
        category: &str,
    ) -> TaskResult<Option<Task>> {
        self.find_by_keys(title, category, false).await
    }

    async fn list(&self) -> TaskResult<Vec<Task>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
