use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::store::Store;
use crate::error::{Error, Result};
use crate::models::{
    join_request::{Decision, JoinRequest, JoinRequestStatus},
    posting::{Posting, PostingKind},
};

/// Join-request lifecycle for one kind of posting.
///
/// `Pending -> Accepted | Rejected`; both outcomes are final. Accepting runs
/// inside a transaction locked on the posting, so concurrent accepts for the
/// same team are serialised and the roster never grows past `team_size`.
#[derive(Clone)]
pub struct JoinRequestService {
    store: Arc<dyn Store>,
    kind: PostingKind,
}

impl JoinRequestService {
    pub fn new(store: Arc<dyn Store>, kind: PostingKind) -> Self {
        Self { store, kind }
    }

    async fn posting_of_kind(&self, posting_id: Uuid) -> Result<Posting> {
        self.store
            .find_posting(posting_id)
            .await?
            .filter(|p| p.kind == self.kind)
            .ok_or_else(|| Error::NotFound(format!("{} posting not found", self.kind)))
    }

    pub async fn create(
        &self,
        posting_id: Uuid,
        requester_id: Uuid,
        message: Option<String>,
    ) -> Result<JoinRequest> {
        let posting = self.posting_of_kind(posting_id).await?;

        if !posting.is_accepting() {
            return Err(Error::InvalidState(format!(
                "{} is not accepting members (status: {})",
                posting.title,
                posting.status.as_str()
            )));
        }
        if posting.is_owner(requester_id) {
            return Err(Error::Forbidden("Owners cannot request to join their own posting".into()));
        }
        if posting.is_member(requester_id) {
            return Err(Error::AlreadyMember);
        }
        if posting.is_full() {
            return Err(Error::CapacityExceeded);
        }
        if self.store.find_candidate(requester_id).await?.is_none() {
            return Err(Error::NotFound("Requester profile not found".into()));
        }
        if self
            .store
            .find_join_request_for(posting_id, requester_id)
            .await?
            .is_some()
        {
            return Err(Error::DuplicateRequest);
        }

        let request = JoinRequest::pending(posting_id, requester_id, message)?;
        let request = self.store.insert_join_request(request).await?;
        tracing::info!(
            request_id = %request.id,
            posting_id = %posting_id,
            requester_id = %requester_id,
            kind = %self.kind,
            "join request created"
        );
        Ok(request)
    }

    pub async fn resolve(
        &self,
        request_id: Uuid,
        reviewer_id: Uuid,
        decision: Decision,
    ) -> Result<JoinRequest> {
        let request = self
            .store
            .find_join_request(request_id)
            .await?
            .ok_or_else(|| Error::NotFound("Join request not found".into()))?;
        let posting = self.posting_of_kind(request.posting_id).await?;

        if !posting.is_owner(reviewer_id) {
            tracing::warn!(
                request_id = %request_id,
                reviewer_id = %reviewer_id,
                "join request resolution refused for non-owner"
            );
            return Err(Error::Forbidden("Only the posting owner can resolve join requests".into()));
        }
        if !request.is_pending() {
            return Err(Error::InvalidState(format!(
                "Join request is already {}",
                request.status.as_str()
            )));
        }

        let mut tx = self.store.begin(posting.id).await?;

        // Re-read under the posting lock; another reviewer call may have won.
        let current = tx
            .join_request(request_id)
            .await?
            .ok_or_else(|| Error::NotFound("Join request not found".into()))?;
        if !current.is_pending() {
            return Err(Error::InvalidState(format!(
                "Join request is already {}",
                current.status.as_str()
            )));
        }

        if decision == Decision::Accept {
            let locked = tx.posting().await?;
            if locked.is_full() {
                tracing::warn!(
                    request_id = %request_id,
                    posting_id = %locked.id,
                    members = locked.members.len(),
                    team_size = locked.team_size,
                    "accept refused, team is full"
                );
                return Err(Error::CapacityExceeded);
            }
            if locked.is_member(current.requester_id) {
                return Err(Error::AlreadyMember);
            }
            tx.add_member(current.requester_id).await?;
            tx.record_joined(current.requester_id).await?;
        }

        let resolved = tx
            .resolve_request(request_id, decision.outcome(), reviewer_id, Utc::now())
            .await?;
        tx.commit().await?;

        tracing::info!(
            request_id = %request_id,
            posting_id = %resolved.posting_id,
            status = resolved.status.as_str(),
            kind = %self.kind,
            "join request resolved"
        );
        Ok(resolved)
    }

    /// Requests for a posting, visible to its owner only.
    pub async fn list_for_posting(&self, posting_id: Uuid, reviewer_id: Uuid) -> Result<Vec<JoinRequest>> {
        let posting = self.posting_of_kind(posting_id).await?;
        if !posting.is_owner(reviewer_id) {
            return Err(Error::Forbidden("Only the posting owner can list join requests".into()));
        }
        self.store.list_join_requests_for_posting(posting_id).await
    }

    pub async fn pending_count(&self, posting_id: Uuid) -> Result<usize> {
        let requests = self.store.list_join_requests_for_posting(posting_id).await?;
        Ok(requests
            .iter()
            .filter(|r| r.status == JoinRequestStatus::Pending)
            .count())
    }
}

/// A candidate's own requests across both kinds, newest first.
pub async fn list_for_requester(store: &dyn Store, requester_id: Uuid) -> Result<Vec<JoinRequest>> {
    store.list_join_requests_by_requester(requester_id).await
}
