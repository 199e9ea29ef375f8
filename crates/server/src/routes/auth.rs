use std::sync::Arc;

use axum::{extract::{Request, State}, http::header::AUTHORIZATION, middleware::Next, response::{IntoResponse, Response}, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use service::access::AccessPolicy;
use service::auth::domain::{LoginInput, TokenPair};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::AuthService;

use crate::errors::{ApiError, INVALID_TOKEN};
use crate::extract::ApiJson;

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub policy: AccessPolicy,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, auth_cfg: &configs::AuthConfig, access_cfg: &configs::AccessConfig) -> Self {
        let repo = Arc::new(SeaOrmAuthRepository::new(db.clone()));
        let auth = Arc::new(AuthService::new(repo, auth_cfg.into()));
        Self { db, auth, policy: AccessPolicy::new(access_cfg) }
    }
}

/// Resolve `Authorization: Bearer <access>` into a [`service::access::Caller`]
/// request extension. No header: the request continues anonymously.
/// A header that does not resolve to a live user: 401.
pub async fn resolve_bearer_token_state(State(state): State<ServerState>, mut req: Request, next: Next) -> Response {
    let Some(raw) = req.headers().get(AUTHORIZATION) else {
        return next.run(req).await;
    };
    let token = raw
        .to_str()
        .ok()
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let Some(token) = token else {
        debug!(event = "auth_header_malformed");
        return ApiError::Unauthenticated(INVALID_TOKEN.to_string()).into_response();
    };
    match state.auth.authenticate(token).await {
        Ok(user) => {
            req.extensions_mut().insert(user.caller());
            next.run(req).await
        }
        Err(e) => {
            if !e.is_auth_failure() {
                warn!(event = "auth_lookup_failed", code = e.code(), error = %e);
            }
            ApiError::from(e).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest { pub refresh: String }

#[derive(Debug, Serialize)]
pub struct AccessToken { pub access: String }

#[derive(Debug, Deserialize)]
pub struct VerifyRequest { pub token: String }

#[utoipa::path(post, path = "/api/v1/auth/token", tag = "auth", request_body = crate::openapi::TokenObtainDoc,
    responses((status = 200, description = "Token pair", body = crate::openapi::TokenPairDoc), (status = 401, description = "Bad credentials")))]
pub async fn obtain_token(State(state): State<ServerState>, ApiJson(input): ApiJson<LoginInput>) -> Result<Json<TokenPair>, ApiError> {
    Ok(Json(state.auth.login(input).await?))
}

#[utoipa::path(post, path = "/api/v1/auth/token/refresh", tag = "auth", request_body = crate::openapi::TokenRefreshDoc,
    responses((status = 200, description = "New access token", body = crate::openapi::AccessTokenDoc), (status = 401, description = "Invalid refresh token")))]
pub async fn refresh_token(State(state): State<ServerState>, ApiJson(input): ApiJson<RefreshRequest>) -> Result<Json<AccessToken>, ApiError> {
    let access = state.auth.refresh(&input.refresh).await?;
    Ok(Json(AccessToken { access }))
}

#[utoipa::path(post, path = "/api/v1/auth/token/verify", tag = "auth", request_body = crate::openapi::TokenVerifyDoc,
    responses((status = 200, description = "Token is valid"), (status = 401, description = "Token is invalid or expired")))]
pub async fn verify_token(State(state): State<ServerState>, ApiJson(input): ApiJson<VerifyRequest>) -> Result<Json<serde_json::Value>, ApiError> {
    state.auth.verify(&input.token)?;
    Ok(Json(serde_json::json!({})))
}
