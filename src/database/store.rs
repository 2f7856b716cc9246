use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    candidate::Candidate,
    join_request::{JoinRequest, JoinRequestStatus},
    posting::{NewPosting, Posting, PostingStatus},
};

/// Persistence for profiles, postings and join requests.
///
/// Listing methods return rows in a stable storage order; recommendation
/// tie-breaks depend on it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_candidate(&self, id: Uuid) -> Result<Option<Candidate>>;

    async fn list_candidates(&self) -> Result<Vec<Candidate>>;

    /// Fails with `Conflict` when a profile with the same id exists.
    async fn insert_candidate(&self, candidate: Candidate) -> Result<Candidate>;

    async fn find_posting(&self, id: Uuid) -> Result<Option<Posting>>;

    /// Postings whose status is the accepting status of their kind.
    async fn list_open_postings(&self) -> Result<Vec<Posting>>;

    async fn insert_posting(&self, posting: NewPosting) -> Result<Posting>;

    async fn update_posting_status(&self, id: Uuid, status: PostingStatus) -> Result<Posting>;

    async fn find_join_request(&self, id: Uuid) -> Result<Option<JoinRequest>>;

    async fn find_join_request_for(
        &self,
        posting_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Option<JoinRequest>>;

    /// Fails with `DuplicateRequest` if the (posting, requester) pair is taken.
    async fn insert_join_request(&self, request: JoinRequest) -> Result<JoinRequest>;

    async fn list_join_requests_for_posting(&self, posting_id: Uuid) -> Result<Vec<JoinRequest>>;

    async fn list_join_requests_by_requester(&self, requester_id: Uuid)
        -> Result<Vec<JoinRequest>>;

    /// Opens a transaction holding the exclusive lock of one posting. Other
    /// transactions on the same posting wait until this one is committed or
    /// dropped; dropping without `commit` discards every staged write.
    async fn begin(&self, posting_id: Uuid) -> Result<Box<dyn PostingTx>>;
}

#[async_trait]
pub trait PostingTx: Send {
    /// Current state of the locked posting, including writes staged so far.
    async fn posting(&mut self) -> Result<Posting>;

    async fn join_request(&mut self, id: Uuid) -> Result<Option<JoinRequest>>;

    async fn add_member(&mut self, candidate_id: Uuid) -> Result<()>;

    async fn record_joined(&mut self, candidate_id: Uuid) -> Result<()>;

    /// Moves a pending request of the locked posting to `status`.
    async fn resolve_request(
        &mut self,
        id: Uuid,
        status: JoinRequestStatus,
        reviewer_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<JoinRequest>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
