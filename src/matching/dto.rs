use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::matching::repo_types::{Decision, MatchingRequest, RequestStatus};

/// Body of a mentee's new matching request.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRequestBody {
    pub mentor_id: Uuid,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a mentor's decision.
#[derive(Debug, Serialize, Deserialize)]
pub struct DecideRequestBody {
    pub status: Decision,
}

/// Wire view of a matching request, for both sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingRequestView {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub mentee_id: Uuid,
    pub message: Option<String>,
    pub status: RequestStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<MatchingRequest> for MatchingRequestView {
    fn from(r: MatchingRequest) -> Self {
        Self {
            id: r.id,
            mentor_id: r.mentor_id,
            mentee_id: r.mentee_id,
            message: r.message,
            status: r.status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decide_body_rejects_pending() {
        assert!(serde_json::from_str::<DecideRequestBody>(r#"{"status":"pending"}"#).is_err());
        let body: DecideRequestBody =
            serde_json::from_str(r#"{"status":"accepted"}"#).unwrap();
        assert_eq!(body.status, Decision::Accepted);
    }

    #[test]
    fn create_body_message_is_optional() {
        let id = Uuid::new_v4();
        let body: CreateRequestBody =
            serde_json::from_str(&format!(r#"{{"mentor_id":"{id}"}}"#)).unwrap();
        assert_eq!(body.mentor_id, id);
        assert!(body.message.is_none());
    }
}
