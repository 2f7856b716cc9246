use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::candidate_dto::{CandidateResponse, RegisterCandidatePayload},
    error::Result,
    middleware::auth::Caller,
    AppState,
};

/// Registers the caller's own profile under the token subject.
#[axum::debug_handler]
pub async fn register_candidate(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(payload): Json<RegisterCandidatePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let candidate = state
        .candidate_service
        .register(caller, &payload.name, payload.skills, payload.interests)
        .await?;
    Ok((StatusCode::CREATED, Json(CandidateResponse::from(candidate))))
}

#[axum::debug_handler]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let candidate = state.candidate_service.get(id).await?;
    Ok(Json(CandidateResponse::from(candidate)))
}
