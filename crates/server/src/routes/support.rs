use axum::{extract::State, http::StatusCode, Json};

use models::support_message;
use service::support::{self, MessagePayload, TicketPayload, TicketView};

use super::auth::ServerState;
use crate::errors::ApiError;
use crate::extract::{ApiJson, CurrentUser, IdPath};

#[utoipa::path(get, path = "/api/v1/support/tickets", tag = "support", security(("bearer" = [])),
    responses((status = 200, description = "Visible tickets with messages", body = [crate::openapi::TicketDoc]), (status = 401, description = "Unauthenticated")))]
pub async fn list_tickets(State(state): State<ServerState>, CurrentUser(caller): CurrentUser) -> Result<Json<Vec<TicketView>>, ApiError> {
    Ok(Json(support::list_tickets(&state.db, &state.policy, Some(&caller)).await?))
}

#[utoipa::path(get, path = "/api/v1/support/tickets/my-tickets", tag = "support", security(("bearer" = [])),
    responses((status = 200, description = "Caller's own tickets", body = [crate::openapi::TicketDoc]), (status = 401, description = "Unauthenticated")))]
pub async fn my_tickets(State(state): State<ServerState>, CurrentUser(caller): CurrentUser) -> Result<Json<Vec<TicketView>>, ApiError> {
    Ok(Json(support::my_tickets(&state.db, Some(&caller)).await?))
}

#[utoipa::path(post, path = "/api/v1/support/tickets", tag = "support", security(("bearer" = [])), request_body = crate::openapi::TicketWriteDoc,
    responses((status = 201, description = "Created", body = crate::openapi::TicketDoc), (status = 400, description = "Validation error"), (status = 401, description = "Unauthenticated")))]
pub async fn create_ticket(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    ApiJson(input): ApiJson<TicketPayload>,
) -> Result<(StatusCode, Json<TicketView>), ApiError> {
    let created = support::create_ticket(&state.db, &state.policy, Some(&caller), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/v1/support/tickets/{id}", tag = "support", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "Ticket id")),
    responses((status = 200, description = "Ticket", body = crate::openapi::TicketDoc), (status = 404, description = "Not found or not visible")))]
pub async fn get_ticket(State(state): State<ServerState>, CurrentUser(caller): CurrentUser, IdPath(id): IdPath) -> Result<Json<TicketView>, ApiError> {
    Ok(Json(support::get_ticket(&state.db, &state.policy, Some(&caller), id).await?))
}

#[utoipa::path(put, path = "/api/v1/support/tickets/{id}", tag = "support", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "Ticket id")),
    request_body = crate::openapi::TicketWriteDoc,
    responses((status = 200, description = "Updated", body = crate::openapi::TicketDoc), (status = 404, description = "Not found or not visible")))]
pub async fn replace_ticket(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    IdPath(id): IdPath,
    ApiJson(input): ApiJson<TicketPayload>,
) -> Result<Json<TicketView>, ApiError> {
    Ok(Json(support::update_ticket(&state.db, &state.policy, Some(&caller), id, input, false).await?))
}

#[utoipa::path(patch, path = "/api/v1/support/tickets/{id}", tag = "support", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "Ticket id")),
    request_body = crate::openapi::TicketWriteDoc,
    responses((status = 200, description = "Updated", body = crate::openapi::TicketDoc), (status = 404, description = "Not found or not visible")))]
pub async fn patch_ticket(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    IdPath(id): IdPath,
    ApiJson(input): ApiJson<TicketPayload>,
) -> Result<Json<TicketView>, ApiError> {
    Ok(Json(support::update_ticket(&state.db, &state.policy, Some(&caller), id, input, true).await?))
}

#[utoipa::path(delete, path = "/api/v1/support/tickets/{id}", tag = "support", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "Ticket id")),
    responses((status = 204, description = "Deleted with its messages"), (status = 404, description = "Not found or not visible")))]
pub async fn delete_ticket(State(state): State<ServerState>, CurrentUser(caller): CurrentUser, IdPath(id): IdPath) -> Result<StatusCode, ApiError> {
    support::delete_ticket(&state.db, &state.policy, Some(&caller), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/v1/support/messages", tag = "support", security(("bearer" = [])),
    responses((status = 200, description = "Messages", body = [crate::openapi::MessageDoc]), (status = 401, description = "Unauthenticated")))]
pub async fn list_messages(State(state): State<ServerState>, CurrentUser(caller): CurrentUser) -> Result<Json<Vec<support_message::Model>>, ApiError> {
    Ok(Json(support::list_messages(&state.db, &state.policy, Some(&caller)).await?))
}

#[utoipa::path(post, path = "/api/v1/support/messages", tag = "support", security(("bearer" = [])), request_body = crate::openapi::MessageWriteDoc,
    responses((status = 201, description = "Created", body = crate::openapi::MessageDoc), (status = 400, description = "Validation error"), (status = 401, description = "Unauthenticated")))]
pub async fn create_message(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    ApiJson(input): ApiJson<MessagePayload>,
) -> Result<(StatusCode, Json<support_message::Model>), ApiError> {
    let created = support::create_message(&state.db, &state.policy, Some(&caller), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/api/v1/support/messages/{id}", tag = "support", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "Message id")),
    responses((status = 200, description = "Message", body = crate::openapi::MessageDoc), (status = 404, description = "Not found")))]
pub async fn get_message(State(state): State<ServerState>, CurrentUser(caller): CurrentUser, IdPath(id): IdPath) -> Result<Json<support_message::Model>, ApiError> {
    Ok(Json(support::get_message(&state.db, &state.policy, Some(&caller), id).await?))
}

#[utoipa::path(put, path = "/api/v1/support/messages/{id}", tag = "support", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "Message id")),
    request_body = crate::openapi::MessageWriteDoc,
    responses((status = 200, description = "Updated", body = crate::openapi::MessageDoc), (status = 404, description = "Not found")))]
pub async fn replace_message(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    IdPath(id): IdPath,
    ApiJson(input): ApiJson<MessagePayload>,
) -> Result<Json<support_message::Model>, ApiError> {
    Ok(Json(support::update_message(&state.db, &state.policy, Some(&caller), id, input, false).await?))
}

#[utoipa::path(patch, path = "/api/v1/support/messages/{id}", tag = "support", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "Message id")),
    request_body = crate::openapi::MessageWriteDoc,
    responses((status = 200, description = "Updated", body = crate::openapi::MessageDoc), (status = 404, description = "Not found")))]
pub async fn patch_message(
    State(state): State<ServerState>,
    CurrentUser(caller): CurrentUser,
    IdPath(id): IdPath,
    ApiJson(input): ApiJson<MessagePayload>,
) -> Result<Json<support_message::Model>, ApiError> {
    Ok(Json(support::update_message(&state.db, &state.policy, Some(&caller), id, input, true).await?))
}

#[utoipa::path(delete, path = "/api/v1/support/messages/{id}", tag = "support", security(("bearer" = [])), params(("id" = uuid::Uuid, Path, description = "Message id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete_message(State(state): State<ServerState>, CurrentUser(caller): CurrentUser, IdPath(id): IdPath) -> Result<StatusCode, ApiError> {
    support::delete_message(&state.db, &state.policy, Some(&caller), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
