use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::FieldErrors;
use crate::{support_message, user, validate};


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "closed")]
    Closed,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "support_ticket")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: TicketStatus,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
    Messages,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Relation::Messages => Entity::has_many(support_message::Entity).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<support_message::Entity> for Entity {
    fn to() -> RelationDef { Relation::Messages.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Validate)]
struct TicketRules {
    #[validate(length(max = 200))]
    subject: Option<String>,
}

/// Length rules for ticket text; presence is checked by the caller.
pub fn validate_fields(errs: &mut FieldErrors, subject: Option<&str>) {
    let rules = TicketRules { subject: subject.map(str::to_owned) };
    validate::collect(errs, rules.validate(), &[]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_progress_is_snake_case() {
        assert_eq!(serde_json::to_value(TicketStatus::InProgress).unwrap(), "in_progress");
        let s: TicketStatus = serde_json::from_value(serde_json::json!("resolved")).unwrap();
        assert_eq!(s, TicketStatus::Resolved);
    }

    #[test]
    fn subject_limited_to_two_hundred_chars() {
        let mut errs = FieldErrors::new();
        validate_fields(&mut errs, Some(&"ç".repeat(200)));
        assert!(errs.is_empty());
        validate_fields(&mut errs, Some(&"x".repeat(201)));
        assert!(errs.contains("subject"));
    }
}
