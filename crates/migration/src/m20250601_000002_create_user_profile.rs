//! Create `user_profile` table, one row per user.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserProfile::Table)
                    .if_not_exists()
                    .col(uuid(UserProfile::Id).primary_key())
                    .col(uuid(UserProfile::UserId).unique_key().not_null())
                    .col(ColumnDef::new(UserProfile::Address).string_len(255).null())
                    .col(ColumnDef::new(UserProfile::Neighborhood).string_len(100).null())
                    .col(string_len(UserProfile::City, 100).not_null().default("Paulista"))
                    .col(string_len(UserProfile::State, 2).not_null().default("PE"))
                    .col(ColumnDef::new(UserProfile::Phone).string_len(20).null())
                    .col(ColumnDef::new(UserProfile::BirthDate).date().null())
                    .col(boolean(UserProfile::IsVulnerable).not_null().default(false))
                    .col(ColumnDef::new(UserProfile::CadUnicoNumber).string_len(20).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_profile_user")
                            .from(UserProfile::Table, UserProfile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserProfile::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum UserProfile {
    Table,
    Id,
    UserId,
    Address,
    Neighborhood,
    City,
    State,
    Phone,
    BirthDate,
    IsVulnerable,
    CadUnicoNumber,
}

#[derive(DeriveIden)]
enum User { Table, Id }
