use serde::{Deserialize, Serialize};

use crate::models::{
    candidate::Candidate,
    match_result::MatchResult,
    posting::{Posting, PostingKind},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeammateSuggestion {
    pub candidate_id: uuid::Uuid,
    pub name: String,
    pub skills: Vec<String>,
    pub score: u8,
    pub matched_skills: Vec<String>,
    pub match_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingSuggestion {
    pub posting_id: uuid::Uuid,
    pub kind: PostingKind,
    pub title: String,
    pub required_skills: Vec<String>,
    pub open_slots: usize,
    pub score: u8,
    pub matched_skills: Vec<String>,
    pub match_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostingRecommendationQuery {
    pub kind: Option<PostingKind>,
}

impl From<MatchResult<Candidate>> for TeammateSuggestion {
    fn from(value: MatchResult<Candidate>) -> Self {
        Self {
            candidate_id: value.item.id,
            name: value.item.name,
            skills: value.item.skills,
            score: value.score,
            matched_skills: value.matched_skills,
            match_count: value.match_count,
        }
    }
}

impl From<MatchResult<Posting>> for PostingSuggestion {
    fn from(value: MatchResult<Posting>) -> Self {
        Self {
            open_slots: value.item.open_slots(),
            posting_id: value.item.id,
            kind: value.item.kind,
            title: value.item.title,
            required_skills: value.item.required_skills,
            score: value.score,
            matched_skills: value.matched_skills,
            match_count: value.match_count,
        }
    }
}

impl<T, U> From<Vec<MatchResult<U>>> for RecommendationResponse<T>
where
    T: From<MatchResult<U>>,
{
    fn from(value: Vec<MatchResult<U>>) -> Self {
        Self {
            items: value.into_iter().map(Into::into).collect(),
        }
    }
}
