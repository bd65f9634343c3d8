mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use clubgrid::{
    api::create_app,
    domain::{CreateInviteRequest, Role},
};
use common::{setup, TestContext};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(ctx: &TestContext) -> Router {
    create_app(ctx.services.clone(), Arc::new(ctx.settings.clone()))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, cookie, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let ctx = setup().await;
    let (status, _, body) = send(app(&ctx), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_api_requires_session() {
    let ctx = setup().await;
    let (status, _, body) = send(app(&ctx), get("/api/members")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthenticated");
}

#[tokio::test]
async fn test_unknown_invite_token() {
    let ctx = setup().await;
    let (status, _, body) = send(app(&ctx), get("/public/invites/not-a-token")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found_or_expired");
}

#[tokio::test]
async fn test_accept_invite_over_http() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    let coach = ctx.member(&club, Role::Coach, "coach@example.com").await;

    let issued = ctx
        .services
        .invite_service
        .create(
            Some(&coach),
            CreateInviteRequest {
                full_name: "New Player".to_string(),
                email: None,
                role: None,
            },
        )
        .await?;
    let token = issued.invite.token.clone();

    let (status, _, body) = send(app(&ctx), get(&format!("/invite/{}", token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["club"]["name"], "FC Example");
    assert_eq!(body["role"], "player");

    let accept = Request::builder()
        .method("POST")
        .uri(format!("/public/invites/{}/accept", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "full_name": "New Player",
                "email": "new.player@example.com",
                "password": "correct-horse"
            })
            .to_string(),
        ))?;
    let (status, cookie, body) = send(app(&ctx), accept).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["redirect_to"], "/player");

    let cookie = cookie.expect("session cookie");
    let session = cookie.split(';').next().unwrap().to_string();
    assert!(session.starts_with("session="));

    let me = Request::builder()
        .uri("/api/me")
        .header(header::COOKIE, session)
        .body(Body::empty())?;
    let (status, _, body) = send(app(&ctx), me).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identity"]["email"], "new.player@example.com");
    assert_eq!(body["club"]["name"], "FC Example");

    // Second use of the same link.
    let (status, _, body) = send(app(&ctx), get(&format!("/invite/{}", token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found_or_expired");
    Ok(())
}

#[tokio::test]
async fn test_player_cannot_create_invites() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    ctx.member(&club, Role::Player, "player@example.com").await;

    let login = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": "player@example.com", "password": "correct-horse" }).to_string(),
        ))?;
    let (status, cookie, _) = send(app(&ctx), login).await;
    assert_eq!(status, StatusCode::OK);
    let session = cookie.unwrap().split(';').next().unwrap().to_string();

    let create = Request::builder()
        .method("POST")
        .uri("/api/invites")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, session)
        .body(Body::from(json!({ "full_name": "Someone" }).to_string()))?;
    let (status, _, body) = send(app(&ctx), create).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "unauthorized");
    Ok(())
}

#[tokio::test]
async fn test_magic_link_over_http() -> anyhow::Result<()> {
    let ctx = setup().await;
    let club = ctx.create_club("FC Example").await;
    ctx.member(&club, Role::Player, "player@example.com").await;

    let post = |uri: &str, body: Value| {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
    };

    // Same answer for unknown addresses.
    let (status, _, _) = send(app(&ctx), post("/auth/magic-link", json!({ "email": "nobody@example.com" }))?).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let (status, _, _) = send(app(&ctx), post("/auth/magic-link", json!({ "email": "player@example.com" }))?).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 1);
    let token = sent[0]
        .text_body
        .split("/magic-link/")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap()
        .to_string();

    let (status, cookie, body) =
        send(app(&ctx), post("/auth/magic-link/confirm", json!({ "token": token }))?).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect_to"], "/player");
    let session = cookie.expect("session cookie").split(';').next().unwrap().to_string();

    let me = Request::builder()
        .uri("/api/me")
        .header(header::COOKIE, session)
        .body(Body::empty())?;
    let (status, _, body) = send(app(&ctx), me).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["identity"]["email"], "player@example.com");

    let (status, cookie, body) =
        send(app(&ctx), post("/auth/magic-link/confirm", json!({ "token": token }))?).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "validation_error");
    assert!(cookie.is_none());
    Ok(())
}
