use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::candidate::Candidate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterCandidatePayload {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub skills: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResponse {
    pub id: uuid::Uuid,
    pub name: String,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub created_postings: Vec<uuid::Uuid>,
    pub joined_postings: Vec<uuid::Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Candidate> for CandidateResponse {
    fn from(value: Candidate) -> Self {
        Self {
            id: value.id,
            name: value.name,
            skills: value.skills,
            interests: value.interests,
            created_postings: value.created_postings,
            joined_postings: value.joined_postings,
            created_at: value.created_at,
        }
    }
}
