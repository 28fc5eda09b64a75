use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use crate::models::{NewTask, Task, normalize_key};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub category: String,
    /// Lowercased, trimmed title used for case-insensitive lookup
    pub title_key: String,
    pub category_key: String,
    /// Set on rows created by template seeding; unique per key pair
    pub seeded: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Task {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            category: model.category,
            created_at: model.created_at.into(),
        }
    }
}

impl ActiveModel {
    pub fn from_new(input: NewTask, seeded: bool) -> Self {
        ActiveModel {
            id: Set(Uuid::now_v7()),
            title_key: Set(normalize_key(&input.title)),
            category_key: Set(normalize_key(&input.category)),
            title: Set(input.title),
            category: Set(input.category),
            seeded: Set(seeded),
            created_at: Set(chrono::Utc::now().into()),
        }
    }
}
