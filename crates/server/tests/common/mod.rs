//! In-process HTTP harness over a fresh in-memory database.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use models::user::{self, Role};
use serde_json::Value;
use server::routes::auth::ServerState;
use service::auth::domain::AuthUser;
use service::test_support::{get_db, insert_user};
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_access(configs::AccessConfig::default()).await
    }

    pub async fn with_access(access: configs::AccessConfig) -> anyhow::Result<Self> {
        let db = get_db().await?;
        let auth = configs::AuthConfig { jwt_secret: "test-secret".into(), ..Default::default() };
        let state = ServerState::new(db, &auth, &access);
        Ok(Self { app: server::build_app(state.clone()), state })
    }

    /// User inserted directly, with a freshly minted access token.
    pub async fn user(&self, username: &str, role: Role) -> anyhow::Result<(user::Model, String)> {
        let u = insert_user(&self.state.db, username, role).await?;
        let pair = self
            .state
            .auth
            .issue_pair(&AuthUser { id: u.id, username: u.username.clone(), role })?;
        Ok((u, pair.access))
    }

    pub async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header("authorization", format!("Bearer {t}"));
        }
        let req = match body {
            Some(v) => builder.header("content-type", "application/json").body(Body::from(v.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        let resp = self.app.clone().oneshot(req).await?;
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, json))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> anyhow::Result<(StatusCode, Value)> {
        self.call("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> anyhow::Result<(StatusCode, Value)> {
        self.call("POST", uri, token, Some(body)).await
    }
}
