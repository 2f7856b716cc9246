use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::candidate::normalize_terms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingKind {
    Project,
    Research,
}

impl PostingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostingKind::Project => "project",
            PostingKind::Research => "research",
        }
    }

    /// The only status in which a posting of this kind takes new members.
    pub fn accepting_status(&self) -> PostingStatus {
        match self {
            PostingKind::Project => PostingStatus::LookingForMembers,
            PostingKind::Research => PostingStatus::OpenForCollaboration,
        }
    }
}

impl fmt::Display for PostingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostingKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "project" => Ok(PostingKind::Project),
            "research" => Ok(PostingKind::Research),
            other => Err(Error::BadRequest(format!("unknown posting kind '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingStatus {
    LookingForMembers,
    InProgress,
    Completed,
    Cancelled,
    OpenForCollaboration,
    Ongoing,
    OnHold,
}

impl PostingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostingStatus::LookingForMembers => "looking_for_members",
            PostingStatus::InProgress => "in_progress",
            PostingStatus::Completed => "completed",
            PostingStatus::Cancelled => "cancelled",
            PostingStatus::OpenForCollaboration => "open_for_collaboration",
            PostingStatus::Ongoing => "ongoing",
            PostingStatus::OnHold => "on_hold",
        }
    }

    pub fn belongs_to(&self, kind: PostingKind) -> bool {
        match kind {
            PostingKind::Project => matches!(
                self,
                PostingStatus::LookingForMembers
                    | PostingStatus::InProgress
                    | PostingStatus::Completed
                    | PostingStatus::Cancelled
            ),
            PostingKind::Research => matches!(
                self,
                PostingStatus::OpenForCollaboration
                    | PostingStatus::Ongoing
                    | PostingStatus::Completed
                    | PostingStatus::OnHold
            ),
        }
    }
}

impl FromStr for PostingStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "looking_for_members" => Ok(PostingStatus::LookingForMembers),
            "in_progress" => Ok(PostingStatus::InProgress),
            "completed" => Ok(PostingStatus::Completed),
            "cancelled" => Ok(PostingStatus::Cancelled),
            "open_for_collaboration" => Ok(PostingStatus::OpenForCollaboration),
            "ongoing" => Ok(PostingStatus::Ongoing),
            "on_hold" => Ok(PostingStatus::OnHold),
            other => Err(Error::BadRequest(format!("unknown posting status '{}'", other))),
        }
    }
}

/// A project or research opportunity with its current roster.
///
/// `members` always contains the owner and never grows past `team_size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub id: Uuid,
    pub kind: PostingKind,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub team_size: i32,
    pub members: Vec<Uuid>,
    pub status: PostingStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Posting {
    pub fn is_accepting(&self) -> bool {
        self.status == self.kind.accepting_status()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.team_size.max(1) as usize
    }

    pub fn is_owner(&self, candidate_id: Uuid) -> bool {
        self.owner_id == candidate_id
    }

    pub fn is_member(&self, candidate_id: Uuid) -> bool {
        self.members.contains(&candidate_id)
    }

    pub fn open_slots(&self) -> usize {
        (self.team_size.max(1) as usize).saturating_sub(self.members.len())
    }
}

/// Validated input for a posting about to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPosting {
    pub kind: PostingKind,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub team_size: i32,
    pub status: PostingStatus,
}

impl NewPosting {
    pub fn new(
        kind: PostingKind,
        owner_id: Uuid,
        title: &str,
        description: &str,
        required_skills: Vec<String>,
        team_size: i32,
        status: Option<PostingStatus>,
    ) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::BadRequest("title must not be empty".into()));
        }
        if team_size < 1 {
            return Err(Error::BadRequest("team_size must be at least 1".into()));
        }
        let status = status.unwrap_or_else(|| kind.accepting_status());
        if !status.belongs_to(kind) {
            return Err(Error::BadRequest(format!(
                "status '{}' is not valid for a {} posting",
                status.as_str(),
                kind
            )));
        }

        Ok(Self {
            kind,
            owner_id,
            title: title.to_string(),
            description: description.trim().to_string(),
            required_skills: normalize_terms(required_skills),
            team_size,
            status,
        })
    }

    pub fn into_posting(self, id: Uuid, created_at: DateTime<Utc>) -> Posting {
        Posting {
            id,
            kind: self.kind,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            required_skills: self.required_skills,
            team_size: self.team_size,
            members: vec![self.owner_id],
            status: self.status,
            created_at: Some(created_at),
        }
    }
}
