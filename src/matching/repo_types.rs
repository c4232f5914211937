use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

/// The three states of a matching request. `pending` is the only live state;
/// the other two are terminal and one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        match self {
            RequestStatus::Pending => false,
            RequestStatus::Accepted | RequestStatus::Rejected => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// A mentor's verdict on a pending request. Deliberately excludes `pending`
/// so "transition back to pending" is unrepresentable in a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accepted,
    Rejected,
}

impl Decision {
    pub fn as_status(self) -> RequestStatus {
        match self {
            Decision::Accepted => RequestStatus::Accepted,
            Decision::Rejected => RequestStatus::Rejected,
        }
    }
}

/// Matching request row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchingRequest {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub message: Option<String>,
    pub status: RequestStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// What a conditional single-row write saw when it matched nothing. The probe
/// runs after the write, purely to pick the right error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureProbe {
    pub owner_id: Uuid,
    pub status: RequestStatus,
}

/// Classify a zero-row conditional write against the probe. A request that
/// does not exist and a request owned by someone else produce the same
/// not-found error, so the caller learns nothing about foreign records. Only
/// the legitimate actor is told the real reason: the state machine already
/// moved on.
pub fn classify_write_miss(probe: Option<FailureProbe>, actor_id: Uuid) -> ApiError {
    match probe {
        None => ApiError::NotFound("matching request not found".into()),
        Some(p) if p.owner_id != actor_id => {
            ApiError::NotFound("matching request not found".into())
        }
        Some(p) => ApiError::InvalidTransition(format!(
            "request is already {}",
            p.status.as_str()
        )),
    }
}
