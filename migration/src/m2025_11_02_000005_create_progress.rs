use sea_orm_migration::prelude::*;

/// Table: user_progress (one row per user+course)
#[derive(DeriveIden)]
enum UserProgress {
    Table,
    Id,
    UserId,
    CourseId,
    LastAccessedAt,
    CreatedAt,
}

/// Table: lesson_completions (FK -> user_progress, unique per lesson)
#[derive(DeriveIden)]
enum LessonCompletions {
    Table,
    Id,
    ProgressId,
    LessonId,
    CompletedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserProgress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserProgress::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserProgress::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserProgress::CourseId).big_integer().not_null())
                    .col(
                        ColumnDef::new(UserProgress::LastAccessedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(UserProgress::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_progress_user")
                            .from(UserProgress::Table, UserProgress::UserId)
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_progress_course")
                            .from(UserProgress::Table, UserProgress::CourseId)
                            .to(Alias::new("courses"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_progress_user_course")
                    .table(UserProgress::Table)
                    .col(UserProgress::UserId)
                    .col(UserProgress::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LessonCompletions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LessonCompletions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LessonCompletions::ProgressId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LessonCompletions::LessonId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LessonCompletions::CompletedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_completions_progress")
                            .from(LessonCompletions::Table, LessonCompletions::ProgressId)
                            .to(UserProgress::Table, UserProgress::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_completions_lesson")
                            .from(LessonCompletions::Table, LessonCompletions::LessonId)
                            .to(Alias::new("lessons"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // marking the same lesson complete twice must be a no-op
        manager
            .create_index(
                Index::create()
                    .name("idx_completions_progress_lesson")
                    .table(LessonCompletions::Table)
                    .col(LessonCompletions::ProgressId)
                    .col(LessonCompletions::LessonId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LessonCompletions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserProgress::Table).to_owned())
            .await
    }
}
