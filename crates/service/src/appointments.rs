//! Appointment scheduling. Visibility: owner, or any professional.
use chrono::{NaiveDate, NaiveTime, Utc};
use models::appointment::{self, AppointmentStatus};
use models::errors::FieldErrors;
use models::{user, validate};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::{self, AccessPolicy, Caller, Operation, Resource};
use crate::errors::ServiceError;

const ENTITY: &str = "appointment";

/// Write payload. A client-supplied `user` is ignored; the owner is always the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentPayload {
    #[serde(default, deserialize_with = "crate::nullable::deserialize")]
    pub professional: Option<Option<Uuid>>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub status: Option<AppointmentStatus>,
    pub description: Option<String>,
}

impl AppointmentPayload {
    async fn validate(&self, db: &DatabaseConnection, partial: bool) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        if !partial {
            validate::required_value(&mut errs, "date", &self.date);
            validate::required_value(&mut errs, "time", &self.time);
        }
        if let Some(Some(pid)) = self.professional {
            if user::Entity::find_by_id(pid).one(db).await?.is_none() {
                errs.add("professional", format!("Invalid pk \"{pid}\" - object does not exist."));
            }
        }
        Ok(errs.into_result()?)
    }
}

/// Load a record the caller may act on; everything else is "not found".
async fn load_visible(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
    id: Uuid,
    op: Operation,
) -> Result<appointment::Model, ServiceError> {
    access::require(caller)?;
    let found = appointment::Entity::find_by_id(id).one(db).await?;
    policy
        .check(caller, Resource::Appointment, op, found.as_ref().map(|a| a.user_id))
        .into_result(ENTITY)?;
    found.ok_or_else(|| ServiceError::not_found(ENTITY))
}

#[instrument(skip_all)]
pub async fn list(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
) -> Result<Vec<appointment::Model>, ServiceError> {
    let scope = policy
        .scope(caller, Resource::Appointment, Operation::Read)
        .ok_or(ServiceError::Unauthenticated)?;
    let mut q = appointment::Entity::find();
    if let Some(owner) = scope.owner_filter() {
        q = q.filter(appointment::Column::UserId.eq(owner));
    }
    Ok(q.order_by_asc(appointment::Column::Date)
        .order_by_asc(appointment::Column::Time)
        .all(db)
        .await?)
}

pub async fn get(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
    id: Uuid,
) -> Result<appointment::Model, ServiceError> {
    load_visible(db, policy, caller, id, Operation::Read).await
}

#[instrument(skip(db, policy, caller, input))]
pub async fn create(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
    input: AppointmentPayload,
) -> Result<appointment::Model, ServiceError> {
    policy.check_create(caller).into_result(ENTITY)?;
    let caller = access::require(caller)?;
    input.validate(db, false).await?;
    let (Some(date), Some(time)) = (input.date, input.time) else {
        return Err(ServiceError::invalid("date", validate::REQUIRED));
    };
    let created = appointment::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(caller.id),
        professional_id: Set(input.professional.flatten()),
        date: Set(date),
        time: Set(time),
        status: Set(input.status.unwrap_or_default()),
        description: Set(input.description.unwrap_or_default()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    info!(event = "appointment_created", appointment_id = %created.id, user_id = %caller.id);
    Ok(created)
}

#[instrument(skip(db, policy, caller, input))]
pub async fn update(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
    id: Uuid,
    input: AppointmentPayload,
    partial: bool,
) -> Result<appointment::Model, ServiceError> {
    let existing = load_visible(db, policy, caller, id, Operation::Write).await?;
    input.validate(db, partial).await?;
    let mut am: appointment::ActiveModel = existing.clone().into();
    if let Some(v) = input.professional { am.professional_id = Set(v); }
    if let Some(v) = input.date { am.date = Set(v); }
    if let Some(v) = input.time { am.time = Set(v); }
    if let Some(v) = input.status { am.status = Set(v); }
    if let Some(v) = input.description { am.description = Set(v); }
    if !am.is_changed() {
        return Ok(existing);
    }
    let updated = am.update(db).await?;
    info!(event = "appointment_updated", appointment_id = %id, status = ?updated.status);
    Ok(updated)
}

#[instrument(skip(db, policy, caller))]
pub async fn delete(
    db: &DatabaseConnection,
    policy: &AccessPolicy,
    caller: Option<&Caller>,
    id: Uuid,
) -> Result<(), ServiceError> {
    let existing = load_visible(db, policy, caller, id, Operation::Write).await?;
    appointment::Entity::delete_by_id(existing.id).exec(db).await?;
    info!(event = "appointment_deleted", appointment_id = %id);
    Ok(())
}
