use std::sync::Arc;

use uuid::Uuid;

use crate::database::store::Store;
use crate::error::{Error, Result};
use crate::models::posting::{NewPosting, Posting, PostingStatus};

#[derive(Clone)]
pub struct PostingService {
    store: Arc<dyn Store>,
}

impl PostingService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, posting: NewPosting) -> Result<Posting> {
        let posting = self.store.insert_posting(posting).await?;
        tracing::info!(
            posting_id = %posting.id,
            owner_id = %posting.owner_id,
            kind = %posting.kind,
            team_size = posting.team_size,
            "posting created"
        );
        Ok(posting)
    }

    pub async fn get(&self, id: Uuid) -> Result<Posting> {
        self.store
            .find_posting(id)
            .await?
            .ok_or_else(|| Error::NotFound("Posting not found".into()))
    }

    /// Owner-only status change. The status has to belong to the posting's kind.
    pub async fn update_status(&self, id: Uuid, owner_id: Uuid, status: PostingStatus) -> Result<Posting> {
        let posting = self.get(id).await?;
        if !posting.is_owner(owner_id) {
            return Err(Error::Forbidden("Only the owner can change the posting status".into()));
        }
        if !status.belongs_to(posting.kind) {
            return Err(Error::BadRequest(format!(
                "status '{}' is not valid for a {} posting",
                status.as_str(),
                posting.kind
            )));
        }
        self.store.update_posting_status(id, status).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::{candidate::Candidate, posting::PostingKind};

    #[tokio::test]
    async fn status_changes_are_owner_only_and_kind_checked() {
        let store = Arc::new(MemoryStore::new());
        let owner = Uuid::new_v4();
        store
            .insert_candidate(Candidate::new(owner, "owner", vec![], vec![]))
            .await
            .unwrap();
        let service = PostingService::new(store.clone());
        let posting = service
            .create(NewPosting::new(PostingKind::Research, owner, "Lab", "", vec![], 3, None).unwrap())
            .await
            .unwrap();

        let err = service
            .update_status(posting.id, Uuid::new_v4(), PostingStatus::Ongoing)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        let err = service
            .update_status(posting.id, owner, PostingStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));

        let updated = service
            .update_status(posting.id, owner, PostingStatus::OnHold)
            .await
            .unwrap();
        assert_eq!(updated.status, PostingStatus::OnHold);
        assert!(!updated.is_accepting());

        let owner = store.find_candidate(owner).await.unwrap().unwrap();
        assert_eq!(owner.created_postings, vec![posting.id]);
    }
}
