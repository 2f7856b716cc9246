use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use uuid::Uuid;

use crate::{
    dto::recommendation_dto::{
        PostingRecommendationQuery, PostingSuggestion, RecommendationResponse, TeammateSuggestion,
    },
    error::Result,
    AppState,
};

#[axum::debug_handler]
pub async fn recommended_teammates(
    State(state): State<AppState>,
    Path(posting_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let ranked = state
        .recommendation_service
        .recommend_teammates(posting_id)
        .await?;
    Ok(Json(RecommendationResponse::<TeammateSuggestion>::from(ranked)))
}

#[axum::debug_handler]
pub async fn recommended_postings(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Query(query): Query<PostingRecommendationQuery>,
) -> Result<impl IntoResponse> {
    let ranked = state
        .recommendation_service
        .recommend_postings(candidate_id, query.kind)
        .await?;
    Ok(Json(RecommendationResponse::<PostingSuggestion>::from(ranked)))
}
