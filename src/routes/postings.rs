use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::posting_dto::{CreatePostingPayload, PostingResponse, UpdatePostingStatusPayload},
    error::Result,
    middleware::auth::Caller,
    models::posting::NewPosting,
    AppState,
};

#[axum::debug_handler]
pub async fn create_posting(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(payload): Json<CreatePostingPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let new_posting = NewPosting::new(
        payload.kind,
        caller,
        &payload.title,
        &payload.description,
        payload.required_skills,
        payload.team_size,
        payload.status,
    )?;
    let posting = state.posting_service.create(new_posting).await?;
    Ok((StatusCode::CREATED, Json(PostingResponse::from(posting))))
}

/// Owners also see how many requests are waiting on them.
#[axum::debug_handler]
pub async fn get_posting(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let posting = state.posting_service.get(id).await?;
    if posting.is_owner(caller) {
        let pending = state.join_requests(posting.kind).pending_count(id).await?;
        return Ok(Json(PostingResponse::from(posting).with_pending(pending)));
    }
    Ok(Json(PostingResponse::from(posting)))
}

#[axum::debug_handler]
pub async fn update_posting_status(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostingStatusPayload>,
) -> Result<impl IntoResponse> {
    let posting = state
        .posting_service
        .update_status(id, caller, payload.status)
        .await?;
    Ok(Json(PostingResponse::from(posting)))
}
