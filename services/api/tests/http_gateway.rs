//! Integration tests for `HttpGateway` against an in-process HTTP server
//!
//! The server mimics the site API closely enough to check the wire
//! contract: bearer token attachment, JSON bodies, multipart uploads and the
//! mapping of error statuses and `detail` bodies.

use std::sync::Arc;

use api::{
    ApiError, ApiGateway, ApiRequest, HttpGateway, UploadFile, endpoints,
    models::{LoginRequest, Project, UploadFolder},
};
use auth::AuthSession;
use axum::{
    Json, Router,
    extract::{Multipart, Path},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use common::storage::MemoryStore;
use serde_json::{Value, json};
use tokio::net::TcpListener;

const TOKEN: &str = "server-issued-token";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {}", TOKEN).as_str())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Could not validate credentials"})),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "admin" && body["password"] == "Admin@123" {
        Json(json!({"access_token": TOKEN, "token_type": "bearer"})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect username or password"})),
        )
            .into_response()
    }
}

async fn stats(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "total_projects": 2,
        "total_testimonials": 1,
        "total_contacts": 3,
        "new_contacts": 1
    }))
    .into_response()
}

async fn projects() -> Json<Value> {
    Json(json!([
        {
            "id": "a",
            "title": "Shop",
            "description": "Store front",
            "category": "Web Development",
            "technologies": ["React", "FastAPI"],
            "image": "/uploads/projects/a.png",
            "link": "https://example.com",
            "created_at": "2024-05-01T10:20:30.123456"
        }
    ]))
}

async fn delete_project(headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Project not found"})),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn upload(headers: HeaderMap, mut multipart: Multipart) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut subfolder = String::new();
    let mut file_name = String::new();
    let mut content_type = String::new();
    let mut size = 0;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "subfolder" => subfolder = field.text().await.unwrap_or_default(),
            "file" => {
                file_name = field.file_name().unwrap_or_default().to_string();
                content_type = field.content_type().unwrap_or_default().to_string();
                size = field.bytes().await.map(|b| b.len()).unwrap_or_default();
            }
            _ => {}
        }
    }

    Json(json!({
        "filename": file_name,
        "url": format!("/uploads/{}/{}-{}-{}", subfolder, content_type.replace('/', "_"), size, file_name),
    }))
    .into_response()
}

async fn broken() -> Response {
    (StatusCode::BAD_GATEWAY, "upstream down").into_response()
}

async fn spawn_server() -> anyhow::Result<String> {
    let api = Router::new()
        .route("/admin/login", post(login))
        .route("/admin/stats", get(stats))
        .route("/projects", get(projects))
        .route("/admin/projects/:id", delete(delete_project))
        .route("/admin/upload", post(upload))
        .route("/broken", get(broken));
    let app = Router::new().nest("/api", api);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://{}/api", addr))
}

fn session() -> AuthSession {
    AuthSession::restore(Arc::new(MemoryStore::new()))
}

#[tokio::test]
async fn test_login_then_authenticated_request() -> anyhow::Result<()> {
    let base = spawn_server().await?;
    let session = session();
    let gateway = HttpGateway::new(base, session.clone());

    // Without a token the protected endpoint is refused
    let refused = endpoints::fetch_stats(&gateway).await;
    assert!(matches!(refused, Err(ApiError::Unauthorized(ref d)) if d == "Could not validate credentials"));

    let token = endpoints::admin_login(&gateway, &LoginRequest::new("admin", "Admin@123")).await?;
    session.login(token.access_token);

    let stats = endpoints::fetch_stats(&gateway).await?;
    assert_eq!(stats.total_contacts, 3);
    assert_eq!(stats.new_contacts, 1);
    Ok(())
}

#[tokio::test]
async fn test_wrong_password_maps_to_unauthorized_with_detail() -> anyhow::Result<()> {
    let base = spawn_server().await?;
    let gateway = HttpGateway::new(base, session());

    let result = endpoints::admin_login(&gateway, &LoginRequest::new("admin", "wrong")).await;

    match result {
        Err(error @ ApiError::Unauthorized(_)) => {
            assert_eq!(error.detail(), "Incorrect username or password");
        }
        other => panic!("expected unauthorized, got {:?}", other.map(|_| ())),
    }
    Ok(())
}

#[tokio::test]
async fn test_public_listing_decodes_projects() -> anyhow::Result<()> {
    let base = spawn_server().await?;
    let gateway = HttpGateway::new(base, session());

    let projects = endpoints::list::<Project>(&gateway).await?;

    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].technologies, vec!["React", "FastAPI"]);
    assert!(projects[0].created_at.is_some());
    Ok(())
}

#[tokio::test]
async fn test_delete_statuses() -> anyhow::Result<()> {
    let base = spawn_server().await?;
    let session = session();
    session.login(TOKEN);
    let gateway = HttpGateway::new(base, session);

    endpoints::delete::<Project>(&gateway, "a").await?;

    let missing = endpoints::delete::<Project>(&gateway, "missing").await;
    assert!(matches!(missing, Err(ApiError::NotFound(ref d)) if d == "Project not found"));
    Ok(())
}

#[tokio::test]
async fn test_multipart_upload() -> anyhow::Result<()> {
    let base = spawn_server().await?;
    let session = session();
    session.login(TOKEN);
    let gateway = HttpGateway::new(base, session);

    let file = UploadFile::new("shot.png", vec![1u8, 2, 3, 4]);
    let response = endpoints::upload_image(&gateway, file, UploadFolder::Projects).await?;

    assert_eq!(response.filename, "shot.png");
    assert_eq!(response.url, "/uploads/projects/image_png-4-shot.png");
    Ok(())
}

#[tokio::test]
async fn test_non_json_error_body_and_unreachable_server() -> anyhow::Result<()> {
    let base = spawn_server().await?;
    let gateway = HttpGateway::new(base, session());

    let result = gateway.send(ApiRequest::get("/broken")).await;
    assert!(matches!(
        result,
        Err(ApiError::Server { status: 502, ref detail }) if detail == "Unexpected server error"
    ));

    // Nothing listens on port 9 of localhost
    let offline = HttpGateway::new("http://127.0.0.1:9/api", session());
    let result = offline.send(ApiRequest::get("/projects")).await;
    assert!(matches!(result, Err(ApiError::Network(_))));
    Ok(())
}
