use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::join_request::{Decision, JoinRequest, JoinRequestStatus};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateJoinRequestPayload {
    #[validate(length(max = 500))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveJoinRequestPayload {
    pub decision: Decision,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequestResponse {
    pub id: uuid::Uuid,
    pub posting_id: uuid::Uuid,
    pub requester_id: uuid::Uuid,
    pub message: Option<String>,
    pub status: JoinRequestStatus,
    pub reviewed_by: Option<uuid::Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequestListResponse {
    pub items: Vec<JoinRequestResponse>,
    pub pending: usize,
}

impl From<JoinRequest> for JoinRequestResponse {
    fn from(value: JoinRequest) -> Self {
        Self {
            id: value.id,
            posting_id: value.posting_id,
            requester_id: value.requester_id,
            message: value.message,
            status: value.status,
            reviewed_by: value.reviewed_by,
            resolved_at: value.resolved_at,
            created_at: value.created_at,
        }
    }
}

impl From<Vec<JoinRequest>> for JoinRequestListResponse {
    fn from(value: Vec<JoinRequest>) -> Self {
        let pending = value.iter().filter(|r| r.is_pending()).count();
        Self {
            items: value.into_iter().map(Into::into).collect(),
            pending,
        }
    }
}
