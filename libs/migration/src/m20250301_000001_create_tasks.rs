use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(pk_uuid(Tasks::Id))
                    .col(string(Tasks::Title))
                    .col(string(Tasks::Category))
                    .col(string(Tasks::TitleKey))
                    .col(string(Tasks::CategoryKey))
                    .col(boolean(Tasks::Seeded).default(false))
                    .col(
                        timestamp_with_time_zone(Tasks::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tasks_title_category_key")
                    .table(Tasks::Table)
                    .col(Tasks::TitleKey)
                    .col(Tasks::CategoryKey)
                    .to_owned(),
            )
            .await?;

        // At most one seeded row per normalized (title, category); AI rows may repeat.
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE UNIQUE INDEX IF NOT EXISTS uq_tasks_seeded_title_category
                    ON tasks (title_key, category_key)
                    WHERE seeded
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS uq_tasks_seeded_title_category")
            .await?;

        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Title,
    Category,
    TitleKey,
    CategoryKey,
    Seeded,
    CreatedAt,
}
