use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        repo_types::{Role, User},
        services::CurrentUser,
    },
    error::ApiError,
    matching::{
        dto::{CreateRequestBody, DecideRequestBody, MatchingRequestView},
        repo,
    },
    state::AppState,
};

pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/matching-requests", get(list_requests).post(create_request))
        .route(
            "/matching-requests/:id",
            put(decide_request).delete(withdraw_request),
        )
}

/// Role gates run before any request lookup so an ineligible caller learns
/// nothing about which requests exist.
fn require_role(user: &User, required: Role, action: &str) -> Result<(), ApiError> {
    if user.role == required {
        return Ok(());
    }
    let who = match required {
        Role::Mentor => "mentors",
        Role::Mentee => "mentees",
    };
    Err(ApiError::Forbidden(format!("only {who} can {action}")))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateRequestBody>,
) -> Result<(StatusCode, Json<MatchingRequestView>), ApiError> {
    require_role(&user, Role::Mentee, "create matching requests")?;

    let mentor = User::find_by_id_with_role(&state.db, payload.mentor_id, Role::Mentor)
        .await?
        .ok_or_else(|| ApiError::InvalidTarget("mentor not found".into()))?;

    let request =
        repo::create_pending(&state.db, user.id, mentor.id, payload.message.as_deref()).await?;

    info!(request_id = %request.id, mentor_id = %mentor.id, mentee_id = %user.id, "matching request created");
    Ok((StatusCode::CREATED, Json(request.into())))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_requests(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<MatchingRequestView>>, ApiError> {
    let requests = repo::list_for_actor(&state.db, &user).await?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id, request_id = %id))]
pub async fn decide_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecideRequestBody>,
) -> Result<Json<MatchingRequestView>, ApiError> {
    require_role(&user, Role::Mentor, "decide matching requests")?;

    let request = repo::decide(&state.db, id, user.id, payload.status).await?;

    info!(request_id = %request.id, status = ?request.status, "matching request decided");
    Ok(Json(request.into()))
}

#[instrument(skip(state, user), fields(user_id = %user.id, request_id = %id))]
pub async fn withdraw_request(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_role(&user, Role::Mentee, "withdraw matching requests")?;

    repo::withdraw(&state.db, id, user.id).await?;

    info!(request_id = %id, mentee_id = %user.id, "matching request withdrawn");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod role_gate_tests {
    use super::*;
    use time::OffsetDateTime;

    fn user_with_role(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: "u@example.com".into(),
            password_hash: "h".into(),
            name: "U".into(),
            role,
            bio: None,
            tech_stack: None,
            interests: None,
            avatar_key: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn mentee_gate() {
        let mentee = user_with_role(Role::Mentee);
        let mentor = user_with_role(Role::Mentor);
        assert!(require_role(&mentee, Role::Mentee, "create matching requests").is_ok());
        let err = require_role(&mentor, Role::Mentee, "create matching requests").unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(err.to_string().contains("mentee"));
    }

    #[test]
    fn mentor_gate() {
        let mentor = user_with_role(Role::Mentor);
        let mentee = user_with_role(Role::Mentee);
        assert!(require_role(&mentor, Role::Mentor, "decide matching requests").is_ok());
        assert!(matches!(
            require_role(&mentee, Role::Mentor, "decide matching requests"),
            Err(ApiError::Forbidden(_))
        ));
    }
}
