use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A student profile as seen by matching.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub created_postings: Vec<Uuid>,
    pub joined_postings: Vec<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Candidate {
    pub fn new(id: Uuid, name: impl Into<String>, skills: Vec<String>, interests: Vec<String>) -> Self {
        Self {
            id,
            name: name.into().trim().to_string(),
            skills: normalize_terms(skills),
            interests: normalize_terms(interests),
            created_postings: Vec::new(),
            joined_postings: Vec::new(),
            created_at: None,
        }
    }

    /// True when the candidate created or already joined the posting.
    pub fn has_history_with(&self, posting_id: Uuid) -> bool {
        self.created_postings.contains(&posting_id) || self.joined_postings.contains(&posting_id)
    }
}

/// Trims every term, drops blanks and collapses case-insensitive duplicates,
/// keeping the first spelling seen.
pub fn normalize_terms(terms: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    terms
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}
