use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Failure taxonomy shared by every handler. Each variant carries the
/// human-readable detail returned to the client; the machine-checkable kind
/// is derived from the variant itself.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("authentication required")]
    Unauthenticated,
    #[error("incorrect email or password")]
    InvalidCredentials,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidTarget(String),
    #[error("email already registered")]
    DuplicateIdentity,
    #[error("a pending request to this mentor already exists")]
    DuplicatePending,
    #[error("{0}")]
    InvalidTransition(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthenticated | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) | ApiError::InvalidTarget(_) => StatusCode::NOT_FOUND,
            ApiError::DuplicateIdentity
            | ApiError::DuplicatePending
            | ApiError::InvalidTransition(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::InvalidTarget(_) => "invalid_target",
            ApiError::DuplicateIdentity => "duplicate_identity",
            ApiError::DuplicatePending => "duplicate_pending",
            ApiError::InvalidTransition(_) => "invalid_transition",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(anyhow::Error::from(e))
    }
}

/// Wire shape of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            // Infrastructure details stay in the logs, not on the wire.
            ApiError::Internal(e) => {
                error!(error = %e, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            error: self.kind().to_string(),
            detail,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_statuses_line_up() {
        let cases = [
            (
                ApiError::Validation("bad".into()),
                "validation_error",
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::Unauthenticated,
                "unauthenticated",
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::InvalidCredentials,
                "invalid_credentials",
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::Forbidden("no".into()),
                "forbidden",
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::NotFound("gone".into()),
                "not_found",
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::InvalidTarget("mentor not found".into()),
                "invalid_target",
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::DuplicateIdentity,
                "duplicate_identity",
                StatusCode::CONFLICT,
            ),
            (
                ApiError::DuplicatePending,
                "duplicate_pending",
                StatusCode::CONFLICT,
            ),
            (
                ApiError::InvalidTransition("already decided".into()),
                "invalid_transition",
                StatusCode::CONFLICT,
            ),
        ];
        for (err, kind, status) in cases {
            assert_eq!(err.kind(), kind);
            assert_eq!(err.status(), status);
        }
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused to db host"));
        assert_eq!(err.kind(), "internal");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn error_body_round_trips() {
        let body = ErrorBody {
            error: "duplicate_pending".into(),
            detail: "a pending request to this mentor already exists".into(),
        };
        let json = serde_json::to_string(&body).unwrap();
        let back: ErrorBody = serde_json::from_str(&json).unwrap();
        assert_eq!(back.error, "duplicate_pending");
        assert!(back.detail.contains("pending"));
    }
}
