//! Service offerings. The table is `service`; the module is named for what it
//! holds so it does not collide with the business-layer crate.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::FieldErrors;
use crate::validate;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub duration_minutes: i32,
    pub location: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Validate)]
struct ServiceRules {
    #[validate(length(max = 100))]
    name: Option<String>,
    /// Stored as a 32-bit column.
    #[validate(range(min = 0, max = 2147483647))]
    duration_minutes: Option<i64>,
    #[validate(length(max = 255))]
    location: Option<String>,
}

pub fn validate_fields(
    errs: &mut FieldErrors,
    name: Option<&str>,
    duration_minutes: Option<i64>,
    location: Option<&str>,
) {
    validate::not_blank(errs, "name", name);
    validate::not_blank(errs, "location", location);
    let rules = ServiceRules {
        name: name.map(str::to_owned),
        duration_minutes,
        location: location.map(str::to_owned),
    };
    validate::collect(errs, rules.validate(), &[]);
}
