use sea_orm::{entity::prelude::*, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::FieldErrors;
use crate::{user, validate};

pub const DEFAULT_CITY: &str = "Paulista";
pub const DEFAULT_STATE: &str = "PE";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub birth_date: Option<Date>,
    pub is_vulnerable: bool,
    /// CadÚnico (federal social registry) number.
    #[serde(rename = "cadUnico_number")]
    pub cad_unico_number: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { User }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fresh profile row for `user_id` with every default applied.
pub fn defaults_for(user_id: Uuid) -> ActiveModel {
    ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        address: Set(None),
        neighborhood: Set(None),
        city: Set(DEFAULT_CITY.to_string()),
        state: Set(DEFAULT_STATE.to_string()),
        phone: Set(None),
        birth_date: Set(None),
        is_vulnerable: Set(false),
        cad_unico_number: Set(None),
    }
}

#[derive(Validate)]
struct ProfileRules {
    #[validate(length(max = 255))]
    address: Option<String>,
    #[validate(length(max = 100))]
    neighborhood: Option<String>,
    #[validate(length(max = 100))]
    city: Option<String>,
    #[validate(length(max = 2))]
    state: Option<String>,
    #[validate(length(max = 20))]
    phone: Option<String>,
    #[validate(length(max = 20))]
    cad_unico_number: Option<String>,
}

pub fn validate_fields(
    errs: &mut FieldErrors,
    address: Option<&str>,
    neighborhood: Option<&str>,
    city: Option<&str>,
    state: Option<&str>,
    phone: Option<&str>,
    cad_unico_number: Option<&str>,
) {
    validate::not_blank(errs, "city", city);
    validate::not_blank(errs, "state", state);
    let rules = ProfileRules {
        address: address.map(str::to_owned),
        neighborhood: neighborhood.map(str::to_owned),
        city: city.map(str::to_owned),
        state: state.map(str::to_owned),
        phone: phone.map(str::to_owned),
        cad_unico_number: cad_unico_number.map(str::to_owned),
    };
    validate::collect(errs, rules.validate(), &[("cad_unico_number", "cadUnico_number")]);
}
