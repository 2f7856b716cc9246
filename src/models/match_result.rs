use serde::Serialize;

/// A scored recommendation. Built per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult<T> {
    pub item: T,
    pub score: u8,
    pub matched_skills: Vec<String>,
    pub match_count: usize,
}
