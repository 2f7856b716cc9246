use std::sync::Arc;

use uuid::Uuid;

use crate::database::store::Store;
use crate::error::{Error, Result};
use crate::models::candidate::Candidate;

#[derive(Clone)]
pub struct CandidateService {
    store: Arc<dyn Store>,
}

impl CandidateService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn register(
        &self,
        id: Uuid,
        name: &str,
        skills: Vec<String>,
        interests: Vec<String>,
    ) -> Result<Candidate> {
        let candidate = Candidate::new(id, name, skills, interests);
        if candidate.name.is_empty() {
            return Err(Error::BadRequest("Name is required".into()));
        }
        let candidate = self.store.insert_candidate(candidate).await?;
        tracing::info!(candidate_id = %candidate.id, skills = candidate.skills.len(), "profile registered");
        Ok(candidate)
    }

    pub async fn get(&self, id: Uuid) -> Result<Candidate> {
        self.store
            .find_candidate(id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate not found".into()))
    }
}
