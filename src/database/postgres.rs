use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::store::{PostingTx, Store};
use crate::error::{Error, Result};
use crate::models::{
    candidate::Candidate,
    join_request::{JoinRequest, JoinRequestStatus},
    posting::{NewPosting, Posting, PostingKind, PostingStatus},
};

const CANDIDATE_SELECT: &str = r#"
    SELECT c.id, c.name, c.skills, c.interests,
        ARRAY(SELECT p.id FROM postings p WHERE p.owner_id = c.id ORDER BY p.created_at, p.id) AS created_postings,
        ARRAY(SELECT j.posting_id FROM candidate_joined_postings j WHERE j.candidate_id = c.id ORDER BY j.joined_at) AS joined_postings,
        c.created_at
    FROM candidates c
"#;

const POSTING_SELECT: &str = r#"
    SELECT p.id, p.kind, p.owner_id, p.title, p.description, p.required_skills, p.team_size,
        ARRAY(SELECT m.candidate_id FROM posting_members m WHERE m.posting_id = p.id ORDER BY m.joined_at, m.candidate_id) AS members,
        p.status, p.created_at
    FROM postings p
"#;

const JOIN_REQUEST_COLUMNS: &str =
    "id, posting_id, requester_id, message, status, reviewed_by, resolved_at, created_at";

#[derive(Debug, FromRow)]
struct PostingRow {
    id: Uuid,
    kind: String,
    owner_id: Uuid,
    title: String,
    description: String,
    required_skills: Vec<String>,
    team_size: i32,
    members: Vec<Uuid>,
    status: String,
    created_at: Option<DateTime<Utc>>,
}

impl TryFrom<PostingRow> for Posting {
    type Error = Error;

    fn try_from(row: PostingRow) -> Result<Self> {
        Ok(Posting {
            id: row.id,
            kind: row.kind.parse::<PostingKind>()?,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            required_skills: row.required_skills,
            team_size: row.team_size,
            members: row.members,
            status: row.status.parse::<PostingStatus>()?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct JoinRequestRow {
    id: Uuid,
    posting_id: Uuid,
    requester_id: Uuid,
    message: Option<String>,
    status: String,
    reviewed_by: Option<Uuid>,
    resolved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<JoinRequestRow> for JoinRequest {
    type Error = Error;

    fn try_from(row: JoinRequestRow) -> Result<Self> {
        Ok(JoinRequest {
            id: row.id,
            posting_id: row.posting_id,
            requester_id: row.requester_id,
            message: row.message,
            status: row.status.parse::<JoinRequestStatus>()?,
            reviewed_by: row.reviewed_by,
            resolved_at: row.resolved_at,
            created_at: row.created_at,
        })
    }
}

fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = Error>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        let query = format!("{} WHERE c.id = $1", CANDIDATE_SELECT);
        let candidate = sqlx::query_as::<_, Candidate>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(candidate)
    }

    async fn list_candidates(&self) -> Result<Vec<Candidate>> {
        let query = format!("{} ORDER BY c.created_at, c.id", CANDIDATE_SELECT);
        let candidates = sqlx::query_as::<_, Candidate>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(candidates)
    }

    async fn insert_candidate(&self, candidate: Candidate) -> Result<Candidate> {
        sqlx::query(
            r#"
            INSERT INTO candidates (id, name, skills, interests)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(candidate.id)
        .bind(&candidate.name)
        .bind(&candidate.skills)
        .bind(&candidate.interests)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Conflict("Profile already exists".into())
            }
            other => other.into(),
        })?;

        self.find_candidate(candidate.id)
            .await?
            .ok_or_else(|| Error::Internal("Inserted profile disappeared".into()))
    }

    async fn find_posting(&self, id: Uuid) -> Result<Option<Posting>> {
        let query = format!("{} WHERE p.id = $1", POSTING_SELECT);
        let row = sqlx::query_as::<_, PostingRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Posting::try_from).transpose()
    }

    async fn list_open_postings(&self) -> Result<Vec<Posting>> {
        let query = format!(
            "{} WHERE (p.kind = 'project' AND p.status = $1) OR (p.kind = 'research' AND p.status = $2) ORDER BY p.created_at, p.id",
            POSTING_SELECT
        );
        let rows = sqlx::query_as::<_, PostingRow>(&query)
            .bind(PostingKind::Project.accepting_status().as_str())
            .bind(PostingKind::Research.accepting_status().as_str())
            .fetch_all(&self.pool)
            .await?;
        collect(rows)
    }

    async fn insert_posting(&self, posting: NewPosting) -> Result<Posting> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO postings (id, kind, owner_id, title, description, required_skills, team_size, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id)
        .bind(posting.kind.as_str())
        .bind(posting.owner_id)
        .bind(&posting.title)
        .bind(&posting.description)
        .bind(&posting.required_skills)
        .bind(posting.team_size)
        .bind(posting.status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                Error::NotFound("Owner profile not found".into())
            }
            other => other.into(),
        })?;

        sqlx::query("INSERT INTO posting_members (posting_id, candidate_id) VALUES ($1, $2)")
            .bind(id)
            .bind(posting.owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.find_posting(id)
            .await?
            .ok_or_else(|| Error::Internal("Inserted posting disappeared".into()))
    }

    async fn update_posting_status(&self, id: Uuid, status: PostingStatus) -> Result<Posting> {
        let res = sqlx::query("UPDATE postings SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Posting not found".into()));
        }
        self.find_posting(id)
            .await?
            .ok_or_else(|| Error::NotFound("Posting not found".into()))
    }

    async fn find_join_request(&self, id: Uuid) -> Result<Option<JoinRequest>> {
        let query = format!("SELECT {} FROM join_requests WHERE id = $1", JOIN_REQUEST_COLUMNS);
        let row = sqlx::query_as::<_, JoinRequestRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(JoinRequest::try_from).transpose()
    }

    async fn find_join_request_for(
        &self,
        posting_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Option<JoinRequest>> {
        let query = format!(
            "SELECT {} FROM join_requests WHERE posting_id = $1 AND requester_id = $2",
            JOIN_REQUEST_COLUMNS
        );
        let row = sqlx::query_as::<_, JoinRequestRow>(&query)
            .bind(posting_id)
            .bind(requester_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(JoinRequest::try_from).transpose()
    }

    async fn insert_join_request(&self, request: JoinRequest) -> Result<JoinRequest> {
        let query = format!(
            r#"
            INSERT INTO join_requests (id, posting_id, requester_id, message, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            JOIN_REQUEST_COLUMNS
        );
        let row = sqlx::query_as::<_, JoinRequestRow>(&query)
            .bind(request.id)
            .bind(request.posting_id)
            .bind(request.requester_id)
            .bind(&request.message)
            .bind(request.status.as_str())
            .bind(request.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => Error::DuplicateRequest,
                other => other.into(),
            })?;
        row.try_into()
    }

    async fn list_join_requests_for_posting(&self, posting_id: Uuid) -> Result<Vec<JoinRequest>> {
        let query = format!(
            "SELECT {} FROM join_requests WHERE posting_id = $1 ORDER BY created_at, id",
            JOIN_REQUEST_COLUMNS
        );
        let rows = sqlx::query_as::<_, JoinRequestRow>(&query)
            .bind(posting_id)
            .fetch_all(&self.pool)
            .await?;
        collect(rows)
    }

    async fn list_join_requests_by_requester(
        &self,
        requester_id: Uuid,
    ) -> Result<Vec<JoinRequest>> {
        let query = format!(
            "SELECT {} FROM join_requests WHERE requester_id = $1 ORDER BY created_at DESC, id",
            JOIN_REQUEST_COLUMNS
        );
        let rows = sqlx::query_as::<_, JoinRequestRow>(&query)
            .bind(requester_id)
            .fetch_all(&self.pool)
            .await?;
        collect(rows)
    }

    async fn begin(&self, posting_id: Uuid) -> Result<Box<dyn PostingTx>> {
        let mut tx = self.pool.begin().await?;
        let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM postings WHERE id = $1 FOR UPDATE")
            .bind(posting_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(Error::NotFound("Posting not found".into()));
        }
        Ok(Box::new(PgTx { tx, posting_id }))
    }
}

/// Transaction holding the row lock of one posting until commit or drop.
struct PgTx {
    tx: Transaction<'static, Postgres>,
    posting_id: Uuid,
}

#[async_trait]
impl PostingTx for PgTx {
    async fn posting(&mut self) -> Result<Posting> {
        let query = format!("{} WHERE p.id = $1", POSTING_SELECT);
        let row = sqlx::query_as::<_, PostingRow>(&query)
            .bind(self.posting_id)
            .fetch_one(&mut *self.tx)
            .await?;
        row.try_into()
    }

    async fn join_request(&mut self, id: Uuid) -> Result<Option<JoinRequest>> {
        let query = format!(
            "SELECT {} FROM join_requests WHERE id = $1 FOR UPDATE",
            JOIN_REQUEST_COLUMNS
        );
        let row = sqlx::query_as::<_, JoinRequestRow>(&query)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(JoinRequest::try_from).transpose()
    }

    async fn add_member(&mut self, candidate_id: Uuid) -> Result<()> {
        sqlx::query("INSERT INTO posting_members (posting_id, candidate_id) VALUES ($1, $2)")
            .bind(self.posting_id)
            .bind(candidate_id)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => Error::AlreadyMember,
                other => other.into(),
            })?;
        Ok(())
    }

    async fn record_joined(&mut self, candidate_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO candidate_joined_postings (candidate_id, posting_id)
            VALUES ($1, $2)
            ON CONFLICT (candidate_id, posting_id) DO NOTHING
            "#,
        )
        .bind(candidate_id)
        .bind(self.posting_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn resolve_request(
        &mut self,
        id: Uuid,
        status: JoinRequestStatus,
        reviewer_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<JoinRequest> {
        let query = format!(
            r#"
            UPDATE join_requests
            SET status = $1, reviewed_by = $2, resolved_at = $3
            WHERE id = $4 AND posting_id = $5 AND status = 'pending'
            RETURNING {}
            "#,
            JOIN_REQUEST_COLUMNS
        );
        let row = sqlx::query_as::<_, JoinRequestRow>(&query)
            .bind(status.as_str())
            .bind(reviewer_id)
            .bind(at)
            .bind(id)
            .bind(self.posting_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        match row {
            Some(row) => row.try_into(),
            None => Err(Error::InvalidState(
                "Join request is not pending for this posting".into(),
            )),
        }
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
