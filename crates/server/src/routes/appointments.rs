use axum::{extract::State, http::StatusCode, Json};

use models::appointment;
use service::appointments::{self, AppointmentPayload};

use super::auth::ServerState;
use crate::errors::ApiError;
use crate::extract::{ApiJson, CurrentUser, IdPath};

#[utoipa::path(get, path = "/api/v1/appointments", tag = "appointments", security(("bearer" = [])),
    responses((status = 200, description = "Visible appointments", body = [crate::openapi::AppointmentDoc]), (status = 401, description = "Unauthenticated")))]
pub async fn list(State(state): State<ServerState>, CurrentUser(caller): CurrentUser) -> Result<Json<Vec<appointment::Model>>, ApiError> {
    Ok(Json(appointments::list(&state.db, &state.policy, Some(&caller)).await?))
}

#[utoipa::path(post, path = "/api/v1/appointments", tag = "appointments", security(("bearer" = [])), request_body = crate::openapi::AppointmentWriteDoc,
    responses((status = 201, description = "Created", body = crate::openapi::AppointmentDoc), (status = 400, description = "Validation error"), (status = 401, description = "Unauthenticated")))]
pub async fn create(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    ApiJson(input): ApiJson<AppointmentPayload>,
) -> Result<(StatusCode, Json<appointment::Model>), ApiError> {
    let created = appointments::create(&state.db, &state.policy, Some(&caller), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/v1/appointments/{id}", tag = "appointments", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "Appointment id")),
    responses((status = 200, description = "Appointment", body = crate::openapi::AppointmentDoc), (status = 404, description = "Not found or not visible")))]
pub async fn get(State(state): State<ServerState>, CurrentUser(caller): CurrentUser, IdPath(id): IdPath) -> Result<Json<appointment::Model>, ApiError> {
    Ok(Json(appointments::get(&state.db, &state.policy, Some(&caller), id).await?))
}

#[utoipa::path(put, path = "/api/v1/appointments/{id}", tag = "appointments", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "Appointment id")),
    request_body = crate::openapi::AppointmentWriteDoc,
    responses((status = 200, description = "Updated", body = crate::openapi::AppointmentDoc), (status = 404, description = "Not found or not visible")))]
pub async fn replace(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    IdPath(id): IdPath,
    ApiJson(input): ApiJson<AppointmentPayload>,
) -> Result<Json<appointment::Model>, ApiError> {
    Ok(Json(appointments::update(&state.db, &state.policy, Some(&caller), id, input, false).await?))
}

#[utoipa::path(patch, path = "/api/v1/appointments/{id}", tag = "appointments", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "Appointment id")),
    request_body = crate::openapi::AppointmentWriteDoc,
    responses((status = 200, description = "Updated", body = crate::openapi::AppointmentDoc), (status = 404, description = "Not found or not visible")))]
pub async fn patch(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    IdPath(id): IdPath,
    ApiJson(input): ApiJson<AppointmentPayload>,
) -> Result<Json<appointment::Model>, ApiError> {
    Ok(Json(appointments::update(&state.db, &state.policy, Some(&caller), id, input, true).await?))
}

#[utoipa::path(delete, path = "/api/v1/appointments/{id}", tag = "appointments", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "Appointment id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found or not visible")))]
pub async fn delete(State(state): State<ServerState>, CurrentUser(caller): CurrentUser, IdPath(id): IdPath) -> Result<StatusCode, ApiError> {
    appointments::delete(&state.db, &state.policy, Some(&caller), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
