//! Create `user` table.
//!
//! Identity record; `username` and `cpf` are unique, `cpf` nullable.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Username, 150).unique_key().not_null())
                    .col(string_len(User::Email, 254).not_null().default(""))
                    .col(string_len(User::FirstName, 150).not_null().default(""))
                    .col(string_len(User::LastName, 150).not_null().default(""))
                    .col(
                        ColumnDef::new(User::Cpf)
                            .string_len(14)
                            .null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(User::Document).string_len(100).null())
                    .col(string_len(User::Role, 20).not_null().default("citizen"))
                    .col(timestamp_with_time_zone(User::DateJoined).not_null())
                    .col(timestamp_with_time_zone(User::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User { Table, Id, Username, Email, FirstName, LastName, Cpf, Document, Role, DateJoined, UpdatedAt }
