use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Title: per-owner listing
        manager
            .create_index(
                Index::create()
                    .name("idx_title_owner")
                    .table(Title::Table)
                    .col(Title::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Title: cash-flow range scans (owner_id, due_date)
        manager
            .create_index(
                Index::create()
                    .name("idx_title_owner_due_date")
                    .table(Title::Table)
                    .col(Title::OwnerId)
                    .col(Title::DueDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_title_owner_due_date").table(Title::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_title_owner").table(Title::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Title { Table, OwnerId, DueDate }
