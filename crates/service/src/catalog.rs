//! Service catalog. Reads are public; writes need an authenticated caller.
use models::catalog;
use models::errors::FieldErrors;
use models::validate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::Caller;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicePayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i64>,
    pub location: Option<String>,
}

impl ServicePayload {
    fn validate(&self, partial: bool) -> Result<(), ServiceError> {
        let mut errs = FieldErrors::new();
        if !partial {
            validate::required(&mut errs, "name", self.name.as_deref());
            validate::required_value(&mut errs, "duration_minutes", &self.duration_minutes);
            validate::required(&mut errs, "location", self.location.as_deref());
        }
        catalog::validate_fields(&mut errs, self.name.as_deref(), self.duration_minutes, self.location.as_deref());
        Ok(errs.into_result()?)
    }
}

fn minutes(v: i64) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<catalog::Model>, ServiceError> {
    Ok(catalog::Entity::find().order_by_asc(catalog::Column::Name).all(db).await?)
}

pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<catalog::Model, ServiceError> {
    catalog::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("service"))
}

#[instrument(skip(db, caller, input), fields(caller = %caller.id))]
pub async fn create(db: &DatabaseConnection, caller: &Caller, input: ServicePayload) -> Result<catalog::Model, ServiceError> {
    input.validate(false)?;
    let created = catalog::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.unwrap_or_default()),
        description: Set(input.description.unwrap_or_default()),
        duration_minutes: Set(input.duration_minutes.map(minutes).unwrap_or_default()),
        location: Set(input.location.unwrap_or_default()),
    }
    .insert(db)
    .await?;
    info!(event = "service_created", service_id = %created.id);
    Ok(created)
}

#[instrument(skip(db, caller, input), fields(caller = %caller.id, service_id = %id, partial))]
pub async fn update(
    db: &DatabaseConnection,
    caller: &Caller,
    id: Uuid,
    input: ServicePayload,
    partial: bool,
) -> Result<catalog::Model, ServiceError> {
    let existing = get(db, id).await?;
    input.validate(partial)?;
    let mut am: catalog::ActiveModel = existing.clone().into();
    if let Some(v) = input.name { am.name = Set(v); }
    if let Some(v) = input.description { am.description = Set(v); }
    if let Some(v) = input.duration_minutes { am.duration_minutes = Set(minutes(v)); }
    if let Some(v) = input.location { am.location = Set(v); }
    if !am.is_changed() {
        return Ok(existing);
    }
    let updated = am.update(db).await?;
    info!(event = "service_updated", service_id = %id);
    Ok(updated)
}

#[instrument(skip(db, caller), fields(caller = %caller.id, service_id = %id))]
pub async fn delete(db: &DatabaseConnection, caller: &Caller, id: Uuid) -> Result<(), ServiceError> {
    let res = catalog::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("service"));
    }
    info!(event = "service_deleted", service_id = %id);
    Ok(())
}
