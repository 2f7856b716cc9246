use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::database::store::{PostingTx, Store};
use crate::error::{Error, Result};
use crate::models::{
    candidate::Candidate,
    join_request::{JoinRequest, JoinRequestStatus},
    posting::{NewPosting, Posting, PostingStatus},
};

#[derive(Debug, Default)]
struct Tables {
    candidates: Vec<Candidate>,
    postings: Vec<Posting>,
    requests: Vec<JoinRequest>,
}

impl Tables {
    fn candidate_mut(&mut self, id: Uuid) -> Option<&mut Candidate> {
        self.candidates.iter_mut().find(|c| c.id == id)
    }

    fn posting_mut(&mut self, id: Uuid) -> Option<&mut Posting> {
        self.postings.iter_mut().find(|p| p.id == id)
    }
}

const LOCK_PRUNE_THRESHOLD: usize = 256;

/// Process-local store. Rows keep insertion order; writes to one posting's
/// roster go through a per-posting async mutex. Lock entries nobody holds or
/// waits on are dropped once the lock map reaches `LOCK_PRUNE_THRESHOLD`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    posting_locks: Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn posting_lock(&self, posting_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut locks = self.posting_locks.lock().expect("posting lock map poisoned");
        if locks.len() >= LOCK_PRUNE_THRESHOLD {
            // Clones are only handed out under this map lock, so a count of
            // one means no transaction holds or awaits the entry.
            locks.retain(|id, lock| *id == posting_id || Arc::strong_count(lock) > 1);
        }
        locks.entry(posting_id).or_default().clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        let tables = self.tables.read().expect("store poisoned");
        Ok(tables.candidates.iter().find(|c| c.id == id).cloned())
    }

    async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        let tables = self.tables.read().expect("store poisoned");
        Ok(tables.candidates.clone())
    }

    async fn insert_candidate(&self, mut candidate: Candidate) -> Result<Candidate> {
        let mut tables = self.tables.write().expect("store poisoned");
        if tables.candidates.iter().any(|c| c.id == candidate.id) {
            return Err(Error::Conflict("Profile already exists".into()));
        }
        candidate.created_at.get_or_insert_with(Utc::now);
        tables.candidates.push(candidate.clone());
        Ok(candidate)
    }

    async fn find_posting(&self, id: Uuid) -> Result<Option<Posting>> {
        let tables = self.tables.read().expect("store poisoned");
        Ok(tables.postings.iter().find(|p| p.id == id).cloned())
    }

    async fn list_open_postings(&self) -> Result<Vec<Posting>> {
        let tables = self.tables.read().expect("store poisoned");
        Ok(tables
            .postings
            .iter()
            .filter(|p| p.is_accepting())
            .cloned()
            .collect())
    }

    async fn insert_posting(&self, posting: NewPosting) -> Result<Posting> {
        let mut tables = self.tables.write().expect("store poisoned");
        let owner_id = posting.owner_id;
        let Some(owner) = tables.candidate_mut(owner_id) else {
            return Err(Error::NotFound("Owner profile not found".into()));
        };
        let posting = posting.into_posting(Uuid::new_v4(), Utc::now());
        owner.created_postings.push(posting.id);
        tables.postings.push(posting.clone());
        Ok(posting)
    }

    async fn update_posting_status(&self, id: Uuid, status: PostingStatus) -> Result<Posting> {
        let lock = self.posting_lock(id);
        let _guard = lock.lock().await;
        let mut tables = self.tables.write().expect("store poisoned");
        let posting = tables
            .posting_mut(id)
            .ok_or_else(|| Error::NotFound("Posting not found".into()))?;
        posting.status = status;
        Ok(posting.clone())
    }

    async fn find_join_request(&self, id: Uuid) -> Result<Option<JoinRequest>> {
        let tables = self.tables.read().expect("store poisoned");
        Ok(tables.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn find_join_request_for(
        &self,
        posting_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Option<JoinRequest>> {
        let tables = self.tables.read().expect("store poisoned");
        Ok(tables
            .requests
            .iter()
            .find(|r| r.posting_id == posting_id && r.requester_id == requester_id)
            .cloned())
    }

    async fn insert_join_request(&self, request: JoinRequest) -> Result<JoinRequest> {
        let mut tables = self.tables.write().expect("store poisoned");
        if tables
            .requests
            .iter()
            .any(|r| r.posting_id == request.posting_id && r.requester_id == request.requester_id)
        {
            return Err(Error::DuplicateRequest);
        }
        tables.requests.push(request.clone());
        Ok(request)
    }

    async fn list_join_requests_for_posting(&self, posting_id: Uuid) -> Result<Vec<JoinRequest>> {
        let tables = self.tables.read().expect("store poisoned");
        Ok(tables
            .requests
            .iter()
            .filter(|r| r.posting_id == posting_id)
            .cloned()
            .collect())
    }

    async fn list_join_requests_by_requester(
        &self,
        requester_id: Uuid,
    ) -> Result<Vec<JoinRequest>> {
        let tables = self.tables.read().expect("store poisoned");
        Ok(tables
            .requests
            .iter()
            .rev()
            .filter(|r| r.requester_id == requester_id)
            .cloned()
            .collect())
    }

    async fn begin(&self, posting_id: Uuid) -> Result<Box<dyn PostingTx>> {
        let guard = self.posting_lock(posting_id).lock_owned().await;
        let exists = {
            let tables = self.tables.read().expect("store poisoned");
            tables.postings.iter().any(|p| p.id == posting_id)
        };
        if !exists {
            return Err(Error::NotFound("Posting not found".into()));
        }

        Ok(Box::new(MemoryTx {
            tables: self.tables.clone(),
            posting_id,
            _guard: guard,
            staged: Vec::new(),
        }))
    }
}

#[derive(Debug)]
enum Staged {
    AddMember(Uuid),
    RecordJoined(Uuid),
    Resolve(JoinRequest),
}

struct MemoryTx {
    tables: Arc<RwLock<Tables>>,
    posting_id: Uuid,
    _guard: OwnedMutexGuard<()>,
    staged: Vec<Staged>,
}

impl MemoryTx {
    fn staged_resolution(&self, id: Uuid) -> Option<&JoinRequest> {
        self.staged.iter().rev().find_map(|op| match op {
            Staged::Resolve(r) if r.id == id => Some(r),
            _ => None,
        })
    }
}

#[async_trait]
impl PostingTx for MemoryTx {
    async fn posting(&mut self) -> Result<Posting> {
        let mut posting = {
            let tables = self.tables.read().expect("store poisoned");
            tables
                .postings
                .iter()
                .find(|p| p.id == self.posting_id)
                .cloned()
                .ok_or_else(|| Error::NotFound("Posting not found".into()))?
        };
        for op in &self.staged {
            if let Staged::AddMember(id) = op {
                posting.members.push(*id);
            }
        }
        Ok(posting)
    }

    async fn join_request(&mut self, id: Uuid) -> Result<Option<JoinRequest>> {
        if let Some(staged) = self.staged_resolution(id) {
            return Ok(Some(staged.clone()));
        }
        let tables = self.tables.read().expect("store poisoned");
        Ok(tables.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn add_member(&mut self, candidate_id: Uuid) -> Result<()> {
        self.staged.push(Staged::AddMember(candidate_id));
        Ok(())
    }

    async fn record_joined(&mut self, candidate_id: Uuid) -> Result<()> {
        self.staged.push(Staged::RecordJoined(candidate_id));
        Ok(())
    }

    async fn resolve_request(
        &mut self,
        id: Uuid,
        status: JoinRequestStatus,
        reviewer_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<JoinRequest> {
        let current = self
            .join_request(id)
            .await?
            .filter(|r| r.posting_id == self.posting_id)
            .ok_or_else(|| Error::NotFound("Join request not found".into()))?;
        if !current.is_pending() {
            return Err(Error::InvalidState("Join request is already resolved".into()));
        }

        let resolved = JoinRequest {
            status,
            reviewed_by: Some(reviewer_id),
            resolved_at: Some(at),
            ..current
        };
        self.staged.push(Staged::Resolve(resolved.clone()));
        Ok(resolved)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        let mut tables = this.tables.write().expect("store poisoned");
        for op in this.staged {
            match op {
                Staged::AddMember(candidate_id) => {
                    let posting = tables
                        .posting_mut(this.posting_id)
                        .ok_or_else(|| Error::NotFound("Posting not found".into()))?;
                    if !posting.members.contains(&candidate_id) {
                        posting.members.push(candidate_id);
                    }
                }
                Staged::RecordJoined(candidate_id) => {
                    if let Some(candidate) = tables.candidate_mut(candidate_id) {
                        if !candidate.joined_postings.contains(&this.posting_id) {
                            candidate.joined_postings.push(this.posting_id);
                        }
                    }
                }
                Staged::Resolve(resolved) => {
                    if let Some(slot) = tables.requests.iter_mut().find(|r| r.id == resolved.id) {
                        *slot = resolved;
                    }
                }
            }
        }
        Ok(())
    }
}
