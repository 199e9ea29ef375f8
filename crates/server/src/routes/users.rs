use axum::{extract::State, http::StatusCode, Json};

use service::users::{self, CreateUser, UserPatch, UserView};

use super::auth::ServerState;
use crate::errors::ApiError;
use crate::extract::{ApiJson, CurrentUser, IdPath};

#[utoipa::path(get, path = "/api/v1/users", tag = "users", security(("bearer" = [])),
    responses((status = 200, description = "All users", body = [crate::openapi::UserDoc]), (status = 401, description = "Unauthenticated")))]
pub async fn list(State(state): State<ServerState>, _: CurrentUser) -> Result<Json<Vec<UserView>>, ApiError> {
    Ok(Json(users::list(&state.db).await?))
}

#[utoipa::path(post, path = "/api/v1/users", tag = "users", request_body = crate::openapi::UserCreateDoc,
    responses((status = 201, description = "Registered", body = crate::openapi::UserDoc), (status = 400, description = "Validation error")))]
pub async fn create(State(state): State<ServerState>, ApiJson(input): ApiJson<CreateUser>) -> Result<(StatusCode, Json<UserView>), ApiError> {
    let created = users::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/v1/users/{id}", tag = "users", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "User id")),
    responses((status = 200, description = "User", body = crate::openapi::UserDoc), (status = 404, description = "Not found")))]
pub async fn get(State(state): State<ServerState>, _: CurrentUser, IdPath(id): IdPath) -> Result<Json<UserView>, ApiError> {
    Ok(Json(users::get(&state.db, id).await?))
}

#[utoipa::path(put, path = "/api/v1/users/{id}", tag = "users", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "User id")),
    request_body = crate::openapi::UserUpdateDoc,
    responses((status = 200, description = "Updated", body = crate::openapi::UserDoc), (status = 400, description = "Validation error"), (status = 404, description = "Not found")))]
pub async fn replace(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    IdPath(id): IdPath,
    ApiJson(patch): ApiJson<UserPatch>,
) -> Result<Json<UserView>, ApiError> {
    Ok(Json(users::update(&state.db, &caller, id, patch, false).await?))
}

#[utoipa::path(patch, path = "/api/v1/users/{id}", tag = "users", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "User id")),
    request_body = crate::openapi::UserUpdateDoc,
    responses((status = 200, description = "Updated", body = crate::openapi::UserDoc), (status = 400, description = "Validation error"), (status = 404, description = "Not found")))]
pub async fn patch(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    IdPath(id): IdPath,
    ApiJson(patch): ApiJson<UserPatch>,
) -> Result<Json<UserView>, ApiError> {
    Ok(Json(users::update(&state.db, &caller, id, patch, true).await?))
}

#[utoipa::path(delete, path = "/api/v1/users/{id}", tag = "users", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "User id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete(State(state): State<ServerState>, CurrentUser(caller): CurrentUser, IdPath(id): IdPath) -> Result<StatusCode, ApiError> {
    users::delete(&state.db, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
