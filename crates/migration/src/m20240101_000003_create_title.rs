//! Create `title` table.
//! Financial titles (bills) with due date and value, owned by a user.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Title::Table)
                    .if_not_exists()
                    .col(pk_auto(Title::Id))
                    .col(uuid(Title::OwnerId).not_null())
                    .col(string_len(Title::Kind, 32).not_null())
                    .col(date(Title::DueDate).not_null())
                    .col(double(Title::Value).not_null())
                    .col(string_len(Title::Description, 255).not_null())
                    .col(timestamp_with_time_zone(Title::RegisteredAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_title_owner")
                            .from(Title::Table, Title::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Title::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Title {
    Table,
    Id,
    OwnerId,
    Kind,
    DueDate,
    Value,
    Description,
    RegisteredAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
