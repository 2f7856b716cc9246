use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::posting::{Posting, PostingKind, PostingStatus};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePostingPayload {
    pub kind: PostingKind,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub required_skills: Vec<String>,
    #[validate(range(min = 1, max = 50))]
    pub team_size: i32,
    pub status: Option<PostingStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostingStatusPayload {
    pub status: PostingStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingResponse {
    pub id: uuid::Uuid,
    pub kind: PostingKind,
    pub owner_id: uuid::Uuid,
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub team_size: i32,
    pub members: Vec<uuid::Uuid>,
    pub open_slots: usize,
    pub status: PostingStatus,
    pub accepting_members: bool,
    pub pending_requests: Option<usize>,
    pub created_at: Option<DateTime<Utc>>,
}

impl PostingResponse {
    pub fn with_pending(mut self, pending: usize) -> Self {
        self.pending_requests = Some(pending);
        self
    }
}

impl From<Posting> for PostingResponse {
    fn from(value: Posting) -> Self {
        Self {
            open_slots: value.open_slots(),
            accepting_members: value.is_accepting() && !value.is_full(),
            id: value.id,
            kind: value.kind,
            owner_id: value.owner_id,
            title: value.title,
            description: value.description,
            required_skills: value.required_skills,
            team_size: value.team_size,
            members: value.members,
            status: value.status,
            pending_requests: None,
            created_at: value.created_at,
        }
    }
}
