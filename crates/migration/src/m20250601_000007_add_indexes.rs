use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Appointment: owner-scoped listing and professional lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_appointment_user")
                    .table(Appointment::Table)
                    .col(Appointment::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_appointment_professional")
                    .table(Appointment::Table)
                    .col(Appointment::ProfessionalId)
                    .to_owned(),
            )
            .await?;

        // SupportTicket: owner-scoped listing
        manager
            .create_index(
                Index::create()
                    .name("idx_support_ticket_user")
                    .table(SupportTicket::Table)
                    .col(SupportTicket::UserId)
                    .to_owned(),
            )
            .await?;

        // SupportMessage: thread order within a ticket
        manager
            .create_index(
                Index::create()
                    .name("idx_support_message_ticket_created")
                    .table(SupportMessage::Table)
                    .col(SupportMessage::TicketId)
                    .col(SupportMessage::CreatedAt)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_support_message_ticket_created").table(SupportMessage::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_support_ticket_user").table(SupportTicket::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_appointment_professional").table(Appointment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_appointment_user").table(Appointment::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Appointment { Table, UserId, ProfessionalId }

#[derive(DeriveIden)]
enum SupportTicket { Table, UserId }

#[derive(DeriveIden)]
enum SupportMessage { Table, TicketId, CreatedAt }
