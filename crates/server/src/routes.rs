use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;

pub mod appointments;
pub mod auth;
pub mod services;
pub mod support;
pub mod users;

use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Resource routes under `/api/v1`, behind bearer resolution.
fn resource_routes(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route("/users/:id", get(users::get).put(users::replace).patch(users::patch).delete(users::delete))
        .route("/services", get(services::list).post(services::create))
        .route("/services/:id", get(services::get).put(services::replace).patch(services::patch).delete(services::delete))
        .route("/appointments", get(appointments::list).post(appointments::create))
        .route(
            "/appointments/:id",
            get(appointments::get).put(appointments::replace).patch(appointments::patch).delete(appointments::delete),
        )
        .route("/support/tickets", get(support::list_tickets).post(support::create_ticket))
        .route("/support/tickets/my-tickets", get(support::my_tickets))
        .route("/support/my-tickets", get(support::my_tickets))
        .route(
            "/support/tickets/:id",
            get(support::get_ticket).put(support::replace_ticket).patch(support::patch_ticket).delete(support::delete_ticket),
        )
        .route("/support/messages", get(support::list_messages).post(support::create_message))
        .route(
            "/support/messages/:id",
            get(support::get_message).put(support::replace_message).patch(support::patch_message).delete(support::delete_message),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::resolve_bearer_token_state))
}

/// Token endpoints authenticate by body, so they skip bearer resolution.
fn token_routes() -> Router<ServerState> {
    Router::new()
        .route("/auth/token", post(auth::obtain_token))
        .route("/auth/token/refresh", post(auth::refresh_token))
        .route("/auth/token/verify", post(auth::verify_token))
}

/// Build the full application router: health, docs, token endpoints and resources.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let api = resource_routes(&state).merge(token_routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
