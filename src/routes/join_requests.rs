use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::join_request_dto::{
        CreateJoinRequestPayload, JoinRequestListResponse, JoinRequestResponse,
        ResolveJoinRequestPayload,
    },
    error::{Error, Result},
    middleware::auth::Caller,
    models::posting::PostingKind,
    services::join_request_service,
    AppState,
};

/// An empty body means "no message"; anything else has to be a valid JSON
/// payload, so a malformed message is refused instead of silently dropped.
fn parse_create_payload(headers: &HeaderMap, body: &Bytes) -> Result<CreateJoinRequestPayload> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateJoinRequestPayload::default());
    }
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ct| ct.trim_start().starts_with("application/json"));
    if !is_json {
        return Err(Error::BadRequest(
            "Expected request with `Content-Type: application/json`".into(),
        ));
    }
    let Json(payload) = Json::<CreateJoinRequestPayload>::from_bytes(body)
        .map_err(|rejection| Error::BadRequest(rejection.body_text()))?;
    Ok(payload)
}

async fn create(
    state: &AppState,
    kind: PostingKind,
    posting_id: Uuid,
    requester_id: Uuid,
    payload: CreateJoinRequestPayload,
) -> Result<(StatusCode, Json<JoinRequestResponse>)> {
    payload.validate()?;
    let request = state
        .join_requests(kind)
        .create(posting_id, requester_id, payload.message)
        .await?;
    Ok((StatusCode::CREATED, Json(JoinRequestResponse::from(request))))
}

async fn list(
    state: &AppState,
    kind: PostingKind,
    posting_id: Uuid,
    reviewer_id: Uuid,
) -> Result<Json<JoinRequestListResponse>> {
    let requests = state
        .join_requests(kind)
        .list_for_posting(posting_id, reviewer_id)
        .await?;
    Ok(Json(JoinRequestListResponse::from(requests)))
}

async fn resolve(
    state: &AppState,
    kind: PostingKind,
    request_id: Uuid,
    reviewer_id: Uuid,
    payload: ResolveJoinRequestPayload,
) -> Result<Json<JoinRequestResponse>> {
    let request = state
        .join_requests(kind)
        .resolve(request_id, reviewer_id, payload.decision)
        .await?;
    Ok(Json(JoinRequestResponse::from(request)))
}

#[axum::debug_handler]
pub async fn create_project_request(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let payload = parse_create_payload(&headers, &body)?;
    create(&state, PostingKind::Project, id, caller, payload).await
}

#[axum::debug_handler]
pub async fn create_research_request(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let payload = parse_create_payload(&headers, &body)?;
    create(&state, PostingKind::Research, id, caller, payload).await
}

#[axum::debug_handler]
pub async fn list_project_requests(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    list(&state, PostingKind::Project, id, caller).await
}

#[axum::debug_handler]
pub async fn list_research_requests(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    list(&state, PostingKind::Research, id, caller).await
}

#[axum::debug_handler]
pub async fn resolve_project_request(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResolveJoinRequestPayload>,
) -> Result<impl IntoResponse> {
    resolve(&state, PostingKind::Project, id, caller, payload).await
}

#[axum::debug_handler]
pub async fn resolve_research_request(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResolveJoinRequestPayload>,
) -> Result<impl IntoResponse> {
    resolve(&state, PostingKind::Research, id, caller, payload).await
}

#[axum::debug_handler]
pub async fn list_my_requests(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<impl IntoResponse> {
    let requests = join_request_service::list_for_requester(state.store.as_ref(), caller).await?;
    Ok(Json(JoinRequestListResponse::from(requests)))
}
