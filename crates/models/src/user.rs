use std::str::FromStr;

use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::{self, FieldErrors};
use crate::{user_credentials, user_profile, validate};

/// Stored documents live under this prefix of the media root.
pub const DOCUMENT_PREFIX: &str = "documents/";

/// Caller role. Professionals see every appointment, staff every support ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    #[sea_orm(string_value = "citizen")]
    Citizen,
    #[sea_orm(string_value = "professional")]
    Professional,
    #[sea_orm(string_value = "staff")]
    Staff,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "citizen" => Ok(Role::Citizen),
            "professional" => Ok(Role::Professional),
            "staff" => Ok(Role::Staff),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub cpf: Option<String>,
    pub document: Option<String>,
    pub role: Role,
    pub date_joined: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Profile,
    Credentials,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Profile => Entity::has_one(user_profile::Entity).into(),
            Relation::Credentials => Entity::has_one(user_credentials::Entity).into(),
        }
    }
}

impl Related<user_profile::Entity> for Entity {
    fn to() -> RelationDef { Relation::Profile.def() }
}

impl Related<user_credentials::Entity> for Entity {
    fn to() -> RelationDef { Relation::Credentials.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Validate)]
struct IdentityRules {
    #[validate(length(max = 150))]
    username: Option<String>,
    #[validate(email, length(max = 254))]
    email: Option<String>,
    #[validate(length(max = 150))]
    first_name: Option<String>,
    #[validate(length(max = 150))]
    last_name: Option<String>,
    #[validate(length(max = 14))]
    cpf: Option<String>,
    #[validate(length(max = 100))]
    document: Option<String>,
}

/// Shape rules for the identity fields; `None` means "not supplied".
/// An empty email is allowed.
pub fn validate_fields(
    errs: &mut FieldErrors,
    username: Option<&str>,
    email: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
    cpf: Option<&str>,
    document: Option<&str>,
) {
    validate::not_blank(errs, "username", username);
    if let Some(u) = username {
        if u.chars().any(char::is_whitespace) {
            errs.add("username", "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.");
        }
    }
    let rules = IdentityRules {
        username: username.map(str::to_owned),
        email: email.map(str::trim).filter(|e| !e.is_empty()).map(str::to_owned),
        first_name: first_name.map(str::to_owned),
        last_name: last_name.map(str::to_owned),
        cpf: cpf.map(str::to_owned),
        document: document.map(str::to_owned),
    };
    validate::collect(errs, rules.validate(), &[]);
    if let Some(d) = document {
        if !d.starts_with(DOCUMENT_PREFIX) || d.contains("..") {
            errs.add("document", format!("Document path must be under {DOCUMENT_PREFIX}."));
        }
    }
}

pub async fn find_by_username<C: ConnectionTrait>(db: &C, username: &str) -> Result<Option<Model>, errors::ModelError> {
    Ok(Entity::find().filter(Column::Username.eq(username)).one(db).await?)
}

/// Whether another user (not `except`) already holds `username`.
pub async fn username_taken<C: ConnectionTrait>(db: &C, username: &str, except: Option<Uuid>) -> Result<bool, errors::ModelError> {
    let mut q = Entity::find().filter(Column::Username.eq(username));
    if let Some(id) = except { q = q.filter(Column::Id.ne(id)); }
    Ok(q.one(db).await?.is_some())
}

pub async fn cpf_taken<C: ConnectionTrait>(db: &C, cpf: &str, except: Option<Uuid>) -> Result<bool, errors::ModelError> {
    let mut q = Entity::find().filter(Column::Cpf.eq(cpf));
    if let Some(id) = except { q = q.filter(Column::Id.ne(id)); }
    Ok(q.one(db).await?.is_some())
}
