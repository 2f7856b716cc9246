pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use crate::database::store::Store;
use crate::models::posting::PostingKind;
use crate::services::{
    candidate_service::CandidateService, join_request_service::JoinRequestService,
    posting_service::PostingService, recommendation::RecommendationService,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub candidate_service: CandidateService,
    pub posting_service: PostingService,
    pub recommendation_service: RecommendationService,
    pub project_requests: JoinRequestService,
    pub research_requests: JoinRequestService,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            candidate_service: CandidateService::new(store.clone()),
            posting_service: PostingService::new(store.clone()),
            recommendation_service: RecommendationService::new(store.clone()),
            project_requests: JoinRequestService::new(store.clone(), PostingKind::Project),
            research_requests: JoinRequestService::new(store.clone(), PostingKind::Research),
            jwt_secret: jwt_secret.into(),
            store,
        }
    }

    pub fn join_requests(&self, kind: PostingKind) -> &JoinRequestService {
        match kind {
            PostingKind::Project => &self.project_requests,
            PostingKind::Research => &self.research_requests,
        }
    }
}
