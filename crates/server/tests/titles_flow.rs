use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::{json, Value};
use service::auth::service::AuthConfig;
use tower::Service;

use server::routes::{self, auth};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

async fn build_app() -> anyhow::Result<Router> {
    let cfg = models::db::DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };
    let db = models::db::connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    let auth_cfg = AuthConfig { jwt_secret: Some("test-secret".into()), ..AuthConfig::default() };
    let state = auth::ServerState::new(db, auth_cfg);
    Ok(routes::build_router(state, cors()))
}

async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(v) => builder.header(header::CONTENT_TYPE, "application/json").body(Body::from(serde_json::to_vec(&v)?))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.clone().call(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    Ok((status, value))
}

/// Register and log in a fresh user, returning its bearer token.
async fn login_as(app: &Router, email: &str) -> anyhow::Result<String> {
    let password = "S3curePass!";
    let (status, _) = send(app, "POST", "/auth/register", None, Some(json!({"email": email, "name": "Tester", "password": password}))).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(app, "POST", "/auth/login", None, Some(json!({"email": email, "password": password}))).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(body["token"].as_str().unwrap_or_default().to_string())
}

fn rent(due: &str) -> Value {
    json!({"type": "INVOICE", "due_date": due, "value": 100.0, "description": "rent"})
}

#[tokio::test]
async fn health_is_public() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (status, body) = send(&app, "GET", "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
    Ok(())
}

#[tokio::test]
async fn titles_require_a_valid_token() -> anyhow::Result<()> {
    let app = build_app().await?;

    let (status, _) = send(&app, "GET", "/api/titles", None, None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/titles", Some("not-a-jwt"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let req = Request::builder().uri("/api/titles").header(header::AUTHORIZATION, "Basic abc").body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn crud_round_trip() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = login_as(&app, "crud@example.com").await?;

    let (status, created) = send(&app, "POST", "/api/titles", Some(&token), Some(rent("2024-01-01"))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], "INVOICE");
    assert_eq!(created["due_date"], "2024-01-01");
    let id = created["id"].as_i64().unwrap_or_default();
    assert!(id > 0);

    let (status, fetched) = send(&app, "GET", &format!("/api/titles/{id}"), Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["description"], "rent");
    assert_eq!(fetched["owner_id"], created["owner_id"]);

    let update = json!({"type": "INVOICE", "due_date": "2024-02-01", "value": 150.0, "description": "office rent"});
    let (status, updated) = send(&app, "PUT", &format!("/api/titles/{id}"), Some(&token), Some(update)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["value"], 150.0);
    assert_eq!(updated["registered_at"], created["registered_at"]);

    let (status, list) = send(&app, "GET", "/api/titles", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, "DELETE", &format!("/api/titles/{id}"), Some(&token), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/api/titles/{id}"), Some(&token), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], format!("could not find title with id: {id}"));
    Ok(())
}

#[tokio::test]
async fn missing_field_is_bad_request() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = login_as(&app, "partial@example.com").await?;

    let partial = json!({"type": "INVOICE", "value": 10.0, "description": "no due date"});
    let (status, body) = send(&app, "POST", "/api/titles", Some(&token), Some(partial)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "invalid title");

    let (_, list) = send(&app, "GET", "/api/titles", Some(&token), None).await?;
    assert_eq!(list, json!([]));
    Ok(())
}

#[tokio::test]
async fn other_users_titles_are_invisible() -> anyhow::Result<()> {
    let app = build_app().await?;
    let alice = login_as(&app, "alice@example.com").await?;
    let bob = login_as(&app, "bob@example.com").await?;

    let (_, created) = send(&app, "POST", "/api/titles", Some(&alice), Some(rent("2024-01-01"))).await?;
    let id = created["id"].as_i64().unwrap_or_default();

    let (status, _) = send(&app, "GET", &format!("/api/titles/{id}"), Some(&bob), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "PUT", &format!("/api/titles/{id}"), Some(&bob), Some(rent("2024-03-01"))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/api/titles/{id}"), Some(&bob), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, bobs) = send(&app, "GET", "/api/titles", Some(&bob), None).await?;
    assert_eq!(bobs, json!([]));
    let (_, still_there) = send(&app, "GET", &format!("/api/titles/{id}"), Some(&alice), None).await?;
    assert_eq!(still_there["due_date"], "2024-01-01");
    Ok(())
}

#[tokio::test]
async fn cash_flow_filters_by_due_date() -> anyhow::Result<()> {
    let app = build_app().await?;
    let token = login_as(&app, "cash@example.com").await?;
    for due in ["2024-01-01", "2024-01-31", "2024-02-01"] {
        let (status, _) = send(&app, "POST", "/api/titles", Some(&token), Some(rent(due))).await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", "/api/titles/cash-flow?start=2024-01-01&end=2024-01-31", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let dues: Vec<_> = body.as_array().into_iter().flatten().map(|t| t["due_date"].clone()).collect();
    assert_eq!(dues, vec![json!("2024-01-01"), json!("2024-01-31")]);

    let (status, _) = send(&app, "GET", "/api/titles/cash-flow?start=jan&end=2024-01-31", Some(&token), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "GET", "/api/titles/cash-flow?start=2024-01-01", Some(&token), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn login_cookie_authenticates_requests() -> anyhow::Result<()> {
    let app = build_app().await?;
    login_as(&app, "cookie@example.com").await?;

    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"email": "cookie@example.com", "password": "S3curePass!"}))?))?;
    let resp = app.clone().call(req).await?;
    let set_cookie = resp.headers().get(header::SET_COOKIE).and_then(|v| v.to_str().ok()).unwrap_or_default().to_string();
    assert!(set_cookie.starts_with("auth_token="));
    let pair = set_cookie.split(';').next().unwrap_or_default().to_string();

    let req = Request::builder().uri("/api/titles").header(header::COOKIE, pair).body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn register_and_login_failures() -> anyhow::Result<()> {
    let app = build_app().await?;
    login_as(&app, "dup@example.com").await?;

    let (status, _) = send(&app, "POST", "/auth/register", None, Some(json!({"email": "dup@example.com", "name": "Again", "password": "S3curePass!"}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "POST", "/auth/register", None, Some(json!({"email": "short@example.com", "name": "Short", "password": "short"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/auth/login", None, Some(json!({"email": "dup@example.com", "password": "wrong-pass"}))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> anyhow::Result<()> {
    let app = build_app().await?;
    let (status, doc) = send(&app, "GET", "/api-docs/openapi.json", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"].get("/api/titles/{id}").is_some());
    Ok(())
}
