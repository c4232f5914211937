use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{
        repo_types::{Role, User},
        services::CurrentUser,
    },
    error::ApiError,
    mentors::{
        dto::{MentorListItem, MentorQuery},
        repo,
    },
    state::AppState,
    users::services::avatar_url,
};

pub fn mentor_routes() -> Router<AppState> {
    Router::new()
        .route("/mentors", get(list_mentors))
        .route("/mentors/:id", get(get_mentor))
}

/// Browsing mentors is a mentee capability. The role gate runs before any
/// directory lookup.
fn require_mentee(user: &User) -> Result<(), ApiError> {
    match user.role {
        Role::Mentee => Ok(()),
        Role::Mentor => Err(ApiError::Forbidden(
            "only mentees can browse mentors".into(),
        )),
    }
}

#[instrument(skip(state, user, query), fields(user_id = %user.id))]
pub async fn list_mentors(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<MentorQuery>,
) -> Result<Json<Vec<MentorListItem>>, ApiError> {
    require_mentee(&user)?;

    let mentors = repo::list_mentors(&state.db, &query).await?;
    let mut items = Vec::with_capacity(mentors.len());
    for mentor in &mentors {
        let url = avatar_url(&state, mentor).await;
        items.push(MentorListItem::from_user(mentor, url));
    }
    Ok(Json(items))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_mentor(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MentorListItem>, ApiError> {
    require_mentee(&user)?;

    let mentor = User::find_by_id_with_role(&state.db, id, Role::Mentor)
        .await?
        .ok_or_else(|| ApiError::NotFound("mentor not found".into()))?;

    let url = avatar_url(&state, &mentor).await;
    Ok(Json(MentorListItem::from_user(&mentor, url)))
}
