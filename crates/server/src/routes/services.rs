use axum::{extract::State, http::StatusCode, Json};

use models::catalog;
use service::catalog::{self as catalog_service, ServicePayload};

use super::auth::ServerState;
use crate::errors::ApiError;
use crate::extract::{ApiJson, CurrentUser, IdPath};

#[utoipa::path(get, path = "/api/v1/services", tag = "services",
    responses((status = 200, description = "Catalog", body = [crate::openapi::ServiceDoc])))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<catalog::Model>>, ApiError> {
    Ok(Json(catalog_service::list(&state.db).await?))
}

#[utoipa::path(post, path = "/api/v1/services", tag = "services", security(("bearer" = [])), request_body = crate::openapi::ServiceWriteDoc,
    responses((status = 201, description = "Created", body = crate::openapi::ServiceDoc), (status = 400, description = "Validation error"), (status = 401, description = "Unauthenticated")))]
pub async fn create(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    ApiJson(input): ApiJson<ServicePayload>,
) -> Result<(StatusCode, Json<catalog::Model>), ApiError> {
    let created = catalog_service::create(&state.db, &caller, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/v1/services/{id}", tag = "services", params(("id" = uuid::Uuid, Path, description = "Service id")),
    responses((status = 200, description = "Service", body = crate::openapi::ServiceDoc), (status = 404, description = "Not found")))]
pub async fn get(State(state): State<ServerState>, IdPath(id): IdPath) -> Result<Json<catalog::Model>, ApiError> {
    Ok(Json(catalog_service::get(&state.db, id).await?))
}

#[utoipa::path(put, path = "/api/v1/services/{id}", tag = "services", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "Service id")),
    request_body = crate::openapi::ServiceWriteDoc,
    responses((status = 200, description = "Updated", body = crate::openapi::ServiceDoc), (status = 400, description = "Validation error"), (status = 404, description = "Not found")))]
pub async fn replace(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    IdPath(id): IdPath,
    ApiJson(input): ApiJson<ServicePayload>,
) -> Result<Json<catalog::Model>, ApiError> {
    Ok(Json(catalog_service::update(&state.db, &caller, id, input, false).await?))
}

#[utoipa::path(patch, path = "/api/v1/services/{id}", tag = "services", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "Service id")),
    request_body = crate::openapi::ServiceWriteDoc,
    responses((status = 200, description = "Updated", body = crate::openapi::ServiceDoc), (status = 404, description = "Not found")))]
pub async fn patch(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    IdPath(id): IdPath,
    ApiJson(input): ApiJson<ServicePayload>,
) -> Result<Json<catalog::Model>, ApiError> {
    Ok(Json(catalog_service::update(&state.db, &caller, id, input, true).await?))
}

#[utoipa::path(delete, path = "/api/v1/services/{id}", tag = "services", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "Service id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete(State(state): State<ServerState>, CurrentUser(caller): CurrentUser, IdPath(id): IdPath) -> Result<StatusCode, ApiError> {
    catalog_service::delete(&state.db, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
