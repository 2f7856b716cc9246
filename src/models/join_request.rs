use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

pub const MAX_MESSAGE_LEN: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl JoinRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinRequestStatus::Pending => "pending",
            JoinRequestStatus::Accepted => "accepted",
            JoinRequestStatus::Rejected => "rejected",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, JoinRequestStatus::Pending)
    }
}

impl FromStr for JoinRequestStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(JoinRequestStatus::Pending),
            "accepted" => Ok(JoinRequestStatus::Accepted),
            "rejected" => Ok(JoinRequestStatus::Rejected),
            other => Err(Error::Internal(format!("unknown join request status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn outcome(&self) -> JoinRequestStatus {
        match self {
            Decision::Accept => JoinRequestStatus::Accepted,
            Decision::Reject => JoinRequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: Uuid,
    pub posting_id: Uuid,
    pub requester_id: Uuid,
    pub message: Option<String>,
    pub status: JoinRequestStatus,
    pub reviewed_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl JoinRequest {
    /// Builds a fresh pending request. Blank messages are dropped; messages
    /// over [`MAX_MESSAGE_LEN`] characters are refused.
    pub fn pending(posting_id: Uuid, requester_id: Uuid, message: Option<String>) -> Result<Self> {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        if let Some(m) = &message {
            if m.chars().count() > MAX_MESSAGE_LEN {
                return Err(Error::BadRequest(format!(
                    "message must be at most {} characters",
                    MAX_MESSAGE_LEN
                )));
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            posting_id,
            requester_id,
            message,
            status: JoinRequestStatus::Pending,
            reviewed_by: None,
            resolved_at: None,
            created_at: Utc::now(),
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }
}
