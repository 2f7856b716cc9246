use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::database::store::Store;
use crate::error::{Error, Result};
use crate::models::{
    candidate::Candidate,
    match_result::MatchResult,
    posting::{Posting, PostingKind},
};
use crate::services::skill_matcher::{overlap, score_with_overlap};

pub const MAX_RECOMMENDATIONS: usize = 10;

/// Sorts by descending score, keeping input order among equal scores, and
/// keeps the top [`MAX_RECOMMENDATIONS`].
fn top_matches<T>(mut results: Vec<MatchResult<T>>) -> Vec<MatchResult<T>> {
    // `sort_by` is stable, which is what preserves the storage order on ties.
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(MAX_RECOMMENDATIONS);
    results
}

/// Ranks candidates for a posting. The owner, current members and anyone
/// without a single matching skill are left out.
pub fn rank_teammates(posting: &Posting, candidates: &[Candidate]) -> Vec<MatchResult<Candidate>> {
    let excluded: HashSet<Uuid> = posting
        .members
        .iter()
        .copied()
        .chain(std::iter::once(posting.owner_id))
        .collect();

    let results = candidates
        .iter()
        .filter(|c| !excluded.contains(&c.id))
        .filter_map(|c| {
            let matched = overlap(&c.skills, &posting.required_skills);
            if matched.is_empty() {
                return None;
            }
            let score = score_with_overlap(
                matched.len(),
                &posting.required_skills,
                &c.interests,
                &posting.title,
                &posting.description,
            );
            Some(MatchResult {
                item: c.clone(),
                score,
                match_count: matched.len(),
                matched_skills: matched,
            })
        })
        .collect();

    top_matches(results)
}

/// Ranks postings for a candidate. Only postings that take members, still have
/// room, and that the candidate neither created nor joined are considered.
pub fn rank_postings(
    candidate: &Candidate,
    postings: &[Posting],
    kind: Option<PostingKind>,
) -> Vec<MatchResult<Posting>> {
    let results = postings
        .iter()
        .filter(|p| kind.map_or(true, |k| p.kind == k))
        .filter(|p| p.is_accepting() && !p.is_full())
        .filter(|p| !p.is_owner(candidate.id) && !candidate.has_history_with(p.id))
        .filter_map(|p| {
            let matched = overlap(&candidate.skills, &p.required_skills);
            if matched.is_empty() {
                return None;
            }
            let score = score_with_overlap(
                matched.len(),
                &p.required_skills,
                &candidate.interests,
                &p.title,
                &p.description,
            );
            Some(MatchResult {
                item: p.clone(),
                score,
                match_count: matched.len(),
                matched_skills: matched,
            })
        })
        .collect();

    top_matches(results)
}

#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn Store>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn recommend_teammates(&self, posting_id: Uuid) -> Result<Vec<MatchResult<Candidate>>> {
        let posting = self
            .store
            .find_posting(posting_id)
            .await?
            .ok_or_else(|| Error::NotFound("Posting not found".into()))?;
        let candidates = self.store.list_candidates().await?;
        let ranked = rank_teammates(&posting, &candidates);
        tracing::debug!(
            posting_id = %posting_id,
            pool = candidates.len(),
            returned = ranked.len(),
            "ranked teammates"
        );
        Ok(ranked)
    }

    pub async fn recommend_postings(
        &self,
        candidate_id: Uuid,
        kind: Option<PostingKind>,
    ) -> Result<Vec<MatchResult<Posting>>> {
        let candidate = self
            .store
            .find_candidate(candidate_id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".into()))?;
        let postings = self.store.list_open_postings().await?;
        let ranked = rank_postings(&candidate, &postings, kind);
        tracing::debug!(
            candidate_id = %candidate_id,
            pool = postings.len(),
            returned = ranked.len(),
            "ranked postings"
        );
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::posting::{NewPosting, PostingStatus};
    use chrono::Utc;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn candidate(skills: &[&str], interests: &[&str]) -> Candidate {
        Candidate::new(Uuid::new_v4(), "student", strings(skills), strings(interests))
    }

    fn posting(kind: PostingKind, owner: Uuid, required: &[&str], team_size: i32) -> Posting {
        NewPosting::new(kind, owner, "Campus app", "A web app", strings(required), team_size, None)
            .unwrap()
            .into_posting(Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn teammates_exclude_owner_members_and_zero_overlap() {
        let owner = candidate(&["Python"], &[]);
        let member = candidate(&["React"], &[]);
        let a = candidate(&["python", "Django"], &[]);
        let b = candidate(&["Java", "C++"], &["campus"]);

        let mut p = posting(PostingKind::Project, owner.id, &["Python", "React", "MongoDB"], 4);
        p.members.push(member.id);

        let ranked = rank_teammates(&p, &[owner.clone(), member.clone(), a.clone(), b.clone()]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].item.id, a.id);
        assert_eq!(ranked[0].matched_skills, strings(&["python"]));
        assert_eq!(ranked[0].match_count, 1);
        assert_eq!(ranked[0].score, 23);
    }

    #[test]
    fn teammates_sorted_descending_with_stable_ties() {
        let owner = Uuid::new_v4();
        let p = posting(PostingKind::Project, owner, &["Rust", "SQL"], 5);
        let first_tie = candidate(&["Rust"], &[]);
        let best = candidate(&["Rust", "SQL"], &[]);
        let second_tie = candidate(&["SQL"], &[]);

        let ranked = rank_teammates(&p, &[first_tie.clone(), best.clone(), second_tie.clone()]);
        let ids: Vec<Uuid> = ranked.iter().map(|r| r.item.id).collect();
        assert_eq!(ids, vec![best.id, first_tie.id, second_tie.id]);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn teammates_truncated_to_ten() {
        let p = posting(PostingKind::Research, Uuid::new_v4(), &["Rust"], 30);
        let pool: Vec<Candidate> = (0..25).map(|_| candidate(&["rust"], &[])).collect();
        let ranked = rank_teammates(&p, &pool);
        assert_eq!(ranked.len(), MAX_RECOMMENDATIONS);
        let expected: Vec<Uuid> = pool.iter().take(10).map(|c| c.id).collect();
        let got: Vec<Uuid> = ranked.iter().map(|r| r.item.id).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn postings_sorted_with_stable_ties_and_truncated_to_ten() {
        let me = candidate(&["Rust", "SQL"], &[]);
        let other = Uuid::new_v4();
        let best = posting(PostingKind::Project, other, &["Rust", "SQL"], 4);
        let mut pool: Vec<Posting> = (0..15)
            .map(|i| {
                let kind = if i % 2 == 0 { PostingKind::Project } else { PostingKind::Research };
                posting(kind, other, &["Rust", "Go"], 4)
            })
            .collect();
        pool.insert(7, best.clone());

        let ranked = rank_postings(&me, &pool, None);
        assert_eq!(ranked.len(), MAX_RECOMMENDATIONS);
        assert_eq!(ranked[0].item.id, best.id);
        assert_eq!(ranked[0].score, 70);
        assert!(ranked[1..].iter().all(|r| r.score == 35));

        let expected: Vec<Uuid> = pool
            .iter()
            .filter(|p| p.id != best.id)
            .take(MAX_RECOMMENDATIONS - 1)
            .map(|p| p.id)
            .collect();
        let tied: Vec<Uuid> = ranked[1..].iter().map(|r| r.item.id).collect();
        assert_eq!(tied, expected);
    }

    #[test]
    fn postings_filter_status_capacity_and_history() {
        let mut me = candidate(&["Rust"], &[]);
        let other = Uuid::new_v4();

        let open = posting(PostingKind::Project, other, &["Rust"], 3);
        let mut closed = posting(PostingKind::Project, other, &["Rust"], 3);
        closed.status = PostingStatus::InProgress;
        let mut full = posting(PostingKind::Research, other, &["Rust"], 2);
        full.members.push(Uuid::new_v4());
        let mine = posting(PostingKind::Project, me.id, &["Rust"], 3);
        let joined = posting(PostingKind::Research, other, &["Rust"], 5);
        let unrelated = posting(PostingKind::Research, other, &["Figma"], 5);
        me.created_postings.push(mine.id);
        me.joined_postings.push(joined.id);

        let all = vec![open.clone(), closed, full, mine, joined, unrelated];
        let ranked = rank_postings(&me, &all, None);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].item.id, open.id);

        assert!(rank_postings(&me, &all, Some(PostingKind::Research)).is_empty());
    }

    #[test]
    fn postings_prefer_interest_alignment_on_equal_skills() {
        let me = candidate(&["Rust"], &["robot"]);
        let plain = posting(PostingKind::Project, Uuid::new_v4(), &["Rust"], 3);
        let mut themed = posting(PostingKind::Project, Uuid::new_v4(), &["Rust"], 3);
        themed.title = "Robot arm".into();

        let ranked = rank_postings(&me, &[plain.clone(), themed.clone()], None);
        assert_eq!(ranked[0].item.id, themed.id);
        assert_eq!(ranked[0].score, 79);
        assert_eq!(ranked[1].item.id, plain.id);
        assert_eq!(ranked[1].score, 70);
    }

    #[tokio::test]
    async fn unknown_posting_is_not_found() {
        let store = Arc::new(crate::database::MemoryStore::new());
        let service = RecommendationService::new(store);
        let err = service.recommend_teammates(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
