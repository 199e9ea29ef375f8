//! Create `appointment` table.
//!
//! Requester FK cascades; the handling professional is nulled when that user goes away.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appointment::Table)
                    .if_not_exists()
                    .col(uuid(Appointment::Id).primary_key())
                    .col(uuid(Appointment::UserId).not_null())
                    .col(ColumnDef::new(Appointment::ProfessionalId).uuid().null())
                    .col(date(Appointment::Date).not_null())
                    .col(time(Appointment::Time).not_null())
                    .col(string_len(Appointment::Status, 20).not_null().default("pending"))
                    .col(text(Appointment::Description).not_null().default(""))
                    .col(timestamp_with_time_zone(Appointment::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_user")
                            .from(Appointment::Table, Appointment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_professional")
                            .from(Appointment::Table, Appointment::ProfessionalId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Appointment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Appointment { Table, Id, UserId, ProfessionalId, Date, Time, Status, Description, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
