use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use buddyup_backend::{
    database::MemoryStore, middleware::auth::issue_token, routes, AppState,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "test_secret_key";

fn app() -> Router {
    let state = AppState::new(Arc::new(MemoryStore::new()), SECRET);
    routes::router(state, 1_000)
}

fn token_for(id: Uuid) -> String {
    issue_token(SECRET, id, 3600).expect("token")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    caller: Option<Uuid>,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = caller {
        builder = builder.header("Authorization", format!("Bearer {}", token_for(id)));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn post_raw(
    app: &Router,
    uri: &str,
    caller: Uuid,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Authorization", format!("Bearer {}", token_for(caller)));
    if let Some(content_type) = content_type {
        builder = builder.header("Content-Type", content_type);
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn register(app: &Router, name: &str, skills: &[&str]) -> Uuid {
    let id = Uuid::new_v4();
    let (status, body) = send(
        app,
        "POST",
        "/api/candidates",
        Some(id),
        Some(json!({ "name": name, "skills": skills, "interests": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    id
}

async fn create_posting(app: &Router, owner: Uuid, kind: &str, team_size: i32) -> Uuid {
    let (status, body) = send(
        app,
        "POST",
        "/api/postings",
        Some(owner),
        Some(json!({
            "kind": kind,
            "title": "Campus navigation app",
            "description": "Indoor maps for the library",
            "required_skills": ["Rust", "PostgreSQL"],
            "team_size": team_size,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_requires_bearer_token() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/me/join-requests", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn invalid_posting_payload_is_rejected() {
    let app = app();
    let owner = register(&app, "Owner", &["Rust"]).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/postings",
        Some(owner),
        Some(json!({ "kind": "project", "title": "", "team_size": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
}

#[tokio::test]
async fn project_join_flow_end_to_end() {
    let app = app();
    let owner = register(&app, "Owner", &["Design"]).await;
    let alice = register(&app, "Alice", &["rust", "Docker"]).await;
    let bob = register(&app, "Bob", &["PostgreSQL"]).await;
    let carol = register(&app, "Carol", &["Figma"]).await;
    let posting = create_posting(&app, owner, "project", 2).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/postings/{}/recommended-teammates", posting),
        Some(owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let suggested: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(suggested, vec!["Alice", "Bob"]);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{}/join-requests", posting),
        Some(alice),
        Some(json!({ "message": "  I can build the backend  " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["message"], "I can build the backend");
    let alice_request = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{}/join-requests", posting),
        Some(alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "duplicate_request");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{}/join-requests", posting),
        Some(owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{}/join-requests", posting),
        Some(bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let bob_request = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/project-requests/{}/resolve", alice_request),
        Some(carol),
        Some(json!({ "decision": "accept" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/project-requests/{}/resolve", alice_request),
        Some(owner),
        Some(json!({ "decision": "accept" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "accepted");
    assert_eq!(body["reviewed_by"], owner.to_string());

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/project-requests/{}/resolve", bob_request),
        Some(owner),
        Some(json!({ "decision": "accept" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "capacity_exceeded");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/postings/{}", posting),
        Some(owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"].as_array().unwrap().len(), 2);
    assert_eq!(body["open_slots"], 0);
    assert_eq!(body["accepting_members"], false);
    assert_eq!(body["pending_requests"], 1);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/candidates/{}", alice),
        Some(alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["joined_postings"], json!([posting.to_string()]));

    let (status, body) = send(&app, "GET", "/api/me/join-requests", Some(bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pending"], 1);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{}/join-requests", posting),
        Some(alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);
}

#[tokio::test]
async fn research_routes_only_see_research_postings() {
    let app = app();
    let owner = register(&app, "Owner", &["Statistics"]).await;
    let student = register(&app, "Student", &["rust"]).await;
    let project = create_posting(&app, owner, "project", 3).await;
    let research = create_posting(&app, owner, "research", 3).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/research/{}/join-requests", project),
        Some(student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/candidates/{}/recommended-postings?kind=research", student),
        Some(student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["posting_id"], research.to_string());

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/research/{}/join-requests", research),
        Some(student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let request = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/research-requests/{}/resolve", request),
        Some(owner),
        Some(json!({ "decision": "reject" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rejected");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/research-requests/{}/resolve", request),
        Some(owner),
        Some(json!({ "decision": "accept" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "invalid_state");
}

#[tokio::test]
async fn closed_posting_refuses_new_requests() {
    let app = app();
    let owner = register(&app, "Owner", &[]).await;
    let student = register(&app, "Student", &["rust"]).await;
    let posting = create_posting(&app, owner, "project", 4).await;

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/postings/{}/status", posting),
        Some(student),
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/postings/{}/status", posting),
        Some(owner),
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "in_progress");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{}/join-requests", posting),
        Some(student),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "invalid_state");
}

#[tokio::test]
async fn malformed_join_request_body_is_refused() {
    let app = app();
    let owner = register(&app, "Owner", &["Rust"]).await;
    let student = register(&app, "Student", &["rust"]).await;
    let posting = create_posting(&app, owner, "project", 3).await;
    let uri = format!("/api/projects/{}/join-requests", posting);

    let (status, body) = post_raw(
        &app,
        &uri,
        student,
        Some("application/json"),
        r#"{"message": 42}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let (status, body) = post_raw(&app, &uri, student, None, r#"{"message":"hello"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let (status, body) = send(&app, "GET", "/api/me/join-requests", Some(student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 0);

    let (status, body) = post_raw(
        &app,
        &uri,
        student,
        Some("application/json"),
        r#"{"message":"hello"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "hello");
}
