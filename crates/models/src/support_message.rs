use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{support_ticket, user};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "support_message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[serde(rename = "ticket")]
    pub ticket_id: Uuid,
    #[serde(rename = "sender")]
    pub sender_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Ticket,
    Sender,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Ticket => Entity::belongs_to(support_ticket::Entity)
                .from(Column::TicketId)
                .to(support_ticket::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Relation::Sender => Entity::belongs_to(user::Entity)
                .from(Column::SenderId)
                .to(user::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<support_ticket::Entity> for Entity {
    fn to() -> RelationDef { Relation::Ticket.def() }
}

impl ActiveModelBehavior for ActiveModel {}
