//! Request extractors: caller resolution, JSON bodies and id paths with
//! error bodies in the API's own shape.
use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use models::errors::FieldErrors;
use serde::de::DeserializeOwned;
use service::access::Caller;
use uuid::Uuid;

use crate::errors::ApiError;

/// Authenticated caller; 401 when the request is anonymous.
/// List it before `IdPath`/`ApiJson` so anonymous requests fail before the
/// path or body is looked at.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Caller);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .copied()
            .map(CurrentUser)
            .ok_or_else(ApiError::unauthenticated)
    }
}

/// `axum::Json` whose rejection is a 400 in the validation error shape.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(v)) => Ok(ApiJson(v)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(FieldErrors::single("non_field_errors", rejection.body_text()))
}

/// `:id` path segment; anything that is not a UUID cannot name a record.
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| IdPath(id))
            .map_err(|_| ApiError::NotFound)
    }
}
