mod common;

use axum::http::StatusCode;
use common::TestApp;
use models::user::Role;
use sea_orm::EntityTrait;
use serde_json::{json, Value};

fn id_of(v: &Value) -> String {
    v["id"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn tickets_visible_to_owner_and_staff_only() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (alice, alice_token) = app.user("alice", Role::Citizen).await?;
    let (_, bob_token) = app.user("bob", Role::Citizen).await?;
    let (_, staff_token) = app.user("atendente", Role::Staff).await?;

    let (status, ticket) = app
        .post("/api/v1/support/tickets", Some(&alice_token), json!({"subject": "Bolsa", "description": "Pagamento atrasado"}))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ticket["user"], json!(alice.id));
    assert_eq!(ticket["status"], "open");
    assert_eq!(ticket["messages"], json!([]));
    let path = format!("/api/v1/support/tickets/{}", id_of(&ticket));

    let (status, _) = app.get(&path, Some(&bob_token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, list) = app.get("/api/v1/support/tickets", Some(&bob_token)).await?;
    assert_eq!(list, json!([]));

    let (status, _) = app.get(&path, Some(&staff_token)).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, updated) = app
        .call("PATCH", &path, Some(&staff_token), Some(json!({"status": "in_progress"})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "in_progress");

    // staff has no tickets of their own
    for uri in ["/api/v1/support/tickets/my-tickets", "/api/v1/support/my-tickets"] {
        let (status, mine) = app.get(uri, Some(&staff_token)).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(mine, json!([]));
        let (_, mine) = app.get(uri, Some(&alice_token)).await?;
        assert_eq!(mine.as_array().map(Vec::len), Some(1));
    }
    let (status, _) = app.get("/api/v1/support/my-tickets", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn ticket_subject_is_bounded() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (_, token) = app.user("eva", Role::Citizen).await?;
    let (status, body) = app
        .post("/api/v1/support/tickets", Some(&token), json!({"subject": "x".repeat(201), "description": "d"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["subject"].is_array());
    Ok(())
}

#[tokio::test]
async fn messages_nest_under_ticket_and_are_readable_by_any_caller() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let (alice, alice_token) = app.user("alice", Role::Citizen).await?;
    let (_, bob_token) = app.user("bob", Role::Citizen).await?;

    let (_, ticket) = app
        .post("/api/v1/support/tickets", Some(&alice_token), json!({"subject": "Auxílio", "description": "Dúvida"}))
        .await?;
    let (status, msg) = app
        .post("/api/v1/support/messages", Some(&alice_token), json!({"ticket": id_of(&ticket), "message": "Olá"}))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(msg["sender"], json!(alice.id));
    assert_eq!(msg["ticket"], ticket["id"]);

    let (_, detail) = app.get(&format!("/api/v1/support/tickets/{}", id_of(&ticket)), Some(&alice_token)).await?;
    assert_eq!(detail["messages"].as_array().map(Vec::len), Some(1));

    let (status, list) = app.get("/api/v1/support/messages", Some(&bob_token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    let (status, _) = app.get("/api/v1/support/messages", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post("/api/v1/support/messages", Some(&alice_token), json!({"ticket": uuid::Uuid::new_v4(), "message": "?"}))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["ticket"].is_array());

    // deleting the ticket removes its messages
    let (status, _) = app
        .call("DELETE", &format!("/api/v1/support/tickets/{}", id_of(&ticket)), Some(&alice_token), None)
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&format!("/api/v1/support/messages/{}", id_of(&msg)), Some(&alice_token)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn message_mutation_follows_configuration() -> anyhow::Result<()> {
    for restrict in [false, true] {
        let app = TestApp::with_access(configs::AccessConfig { restrict_message_mutation: restrict }).await?;
        let (_, alice_token) = app.user("alice", Role::Citizen).await?;
        let (_, bob_token) = app.user("bob", Role::Citizen).await?;
        let (_, ticket) = app
            .post("/api/v1/support/tickets", Some(&alice_token), json!({"subject": "s", "description": "d"}))
            .await?;
        let (_, msg) = app
            .post("/api/v1/support/messages", Some(&alice_token), json!({"ticket": id_of(&ticket), "message": "oi"}))
            .await?;
        let path = format!("/api/v1/support/messages/{}", id_of(&msg));

        let (status, _) = app.call("PATCH", &path, Some(&bob_token), Some(json!({"message": "editado"}))).await?;
        let expected = if restrict { StatusCode::NOT_FOUND } else { StatusCode::OK };
        assert_eq!(status, expected, "restrict={restrict}");

        // read stays open either way
        let (status, _) = app.get(&path, Some(&bob_token)).await?;
        assert_eq!(status, StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn anonymous_ticket_writes_are_unauthorized_before_body_or_id() -> anyhow::Result<()> {
    let app = TestApp::new().await?;

    let (status, body) = app
        .post("/api/v1/support/tickets", None, json!({"subject": "Bolsa Família", "description": "d"}))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["detail"].is_string());

    // 请求体不合法也先报 401
    let (status, _) = app.post("/api/v1/support/tickets", None, json!({"subject": 5})).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.call("POST", "/api/v1/support/tickets", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call("PATCH", "/api/v1/support/tickets/not-a-uuid", None, Some(json!({"subject": "x"})))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.call("DELETE", &format!("/api/v1/support/tickets/{}", uuid::Uuid::new_v4()), None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(models::support_ticket::Entity::find().all(&app.state.db).await?.is_empty());
    Ok(())
}
