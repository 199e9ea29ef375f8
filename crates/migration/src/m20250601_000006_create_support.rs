//! Create `support_ticket` and `support_message` tables.
//! Messages cascade with their ticket and with their sender.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SupportTicket::Table)
                    .if_not_exists()
                    .col(uuid(SupportTicket::Id).primary_key())
                    .col(uuid(SupportTicket::UserId).not_null())
                    .col(string_len(SupportTicket::Subject, 200).not_null())
                    .col(text(SupportTicket::Description).not_null())
                    .col(string_len(SupportTicket::Status, 20).not_null().default("open"))
                    .col(timestamp_with_time_zone(SupportTicket::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_support_ticket_user")
                            .from(SupportTicket::Table, SupportTicket::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SupportMessage::Table)
                    .if_not_exists()
                    .col(uuid(SupportMessage::Id).primary_key())
                    .col(uuid(SupportMessage::TicketId).not_null())
                    .col(uuid(SupportMessage::SenderId).not_null())
                    .col(text(SupportMessage::Message).not_null())
                    .col(timestamp_with_time_zone(SupportMessage::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_support_message_ticket")
                            .from(SupportMessage::Table, SupportMessage::TicketId)
                            .to(SupportTicket::Table, SupportTicket::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_support_message_sender")
                            .from(SupportMessage::Table, SupportMessage::SenderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SupportMessage::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(SupportTicket::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SupportTicket { Table, Id, UserId, Subject, Description, Status, CreatedAt }

#[derive(DeriveIden)]
enum SupportMessage { Table, Id, TicketId, SenderId, Message, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
