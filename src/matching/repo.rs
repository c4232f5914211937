use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo::is_unique_violation;
use crate::auth::repo_types::{Role, User};
use crate::error::ApiError;
use crate::matching::repo_types::{
    classify_write_miss, Decision, FailureProbe, MatchingRequest, RequestStatus,
};

const REQUEST_COLUMNS: &str = "id, mentor_id, mentee_id, message, status, created_at, updated_at";

/// Insert a new pending request. The partial unique index on
/// (mentor_id, mentee_id) WHERE pending makes the duplicate check and the
/// insert one atomic step; two racing creations cannot both land.
pub async fn create_pending(
    db: &PgPool,
    mentee_id: Uuid,
    mentor_id: Uuid,
    message: Option<&str>,
) -> Result<MatchingRequest, ApiError> {
    sqlx::query_as::<_, MatchingRequest>(&format!(
        r#"
        INSERT INTO matching_requests (mentor_id, mentee_id, message)
        VALUES ($1, $2, $3)
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(mentor_id)
    .bind(mentee_id)
    .bind(message)
    .fetch_one(db)
    .await
    .map_err(|e| {
        if is_unique_violation(&e, "matching_requests_one_pending") {
            ApiError::DuplicatePending
        } else {
            e.into()
        }
    })
}

/// Apply the mentor's one-way decision as a single conditional update. Of two
/// racing decisions exactly one matches `status = 'pending'`; the loser gets
/// zero rows and the probe picks its error. Accepting while another accepted
/// match exists trips the one-accepted index instead.
pub async fn decide(
    db: &PgPool,
    request_id: Uuid,
    mentor_id: Uuid,
    decision: Decision,
) -> Result<MatchingRequest, ApiError> {
    let updated = sqlx::query_as::<_, MatchingRequest>(&format!(
        r#"
        UPDATE matching_requests
           SET status = $3, updated_at = now()
         WHERE id = $1 AND mentor_id = $2 AND status = 'pending'
        RETURNING {REQUEST_COLUMNS}
        "#
    ))
    .bind(request_id)
    .bind(mentor_id)
    .bind(decision.as_status())
    .fetch_optional(db)
    .await
    .map_err(|e| {
        if is_unique_violation(&e, "matching_requests_one_accepted") {
            ApiError::InvalidTransition("you already have an accepted match".into())
        } else {
            ApiError::from(e)
        }
    })?;

    match updated {
        Some(request) => Ok(request),
        None => Err(classify_write_miss(
            probe_for_mentor(db, request_id).await?,
            mentor_id,
        )),
    }
}

/// Remove a pending request the mentee owns. Terminal requests are history
/// and stay put.
pub async fn withdraw(db: &PgPool, request_id: Uuid, mentee_id: Uuid) -> Result<(), ApiError> {
    let deleted: Option<(Uuid,)> = sqlx::query_as(
        r#"
        DELETE FROM matching_requests
         WHERE id = $1 AND mentee_id = $2 AND status = 'pending'
        RETURNING id
        "#,
    )
    .bind(request_id)
    .bind(mentee_id)
    .fetch_optional(db)
    .await?;

    match deleted {
        Some(_) => Ok(()),
        None => Err(classify_write_miss(
            probe_for_mentee(db, request_id).await?,
            mentee_id,
        )),
    }
}

/// Requests visible to the actor: mentors see what targets them, mentees see
/// what they sent. Most recent first.
pub async fn list_for_actor(db: &PgPool, user: &User) -> sqlx::Result<Vec<MatchingRequest>> {
    let column = match user.role {
        Role::Mentor => "mentor_id",
        Role::Mentee => "mentee_id",
    };
    sqlx::query_as::<_, MatchingRequest>(&format!(
        r#"
        SELECT {REQUEST_COLUMNS}
          FROM matching_requests
         WHERE {column} = $1
         ORDER BY created_at DESC
        "#
    ))
    .bind(user.id)
    .fetch_all(db)
    .await
}

async fn probe_for_mentor(db: &PgPool, request_id: Uuid) -> Result<Option<FailureProbe>, ApiError> {
    let row: Option<(Uuid, RequestStatus)> =
        sqlx::query_as("SELECT mentor_id, status FROM matching_requests WHERE id = $1")
            .bind(request_id)
            .fetch_optional(db)
            .await?;
    Ok(row.map(|(owner_id, status)| FailureProbe { owner_id, status }))
}

async fn probe_for_mentee(db: &PgPool, request_id: Uuid) -> Result<Option<FailureProbe>, ApiError> {
    let row: Option<(Uuid, RequestStatus)> =
        sqlx::query_as("SELECT mentee_id, status FROM matching_requests WHERE id = $1")
            .bind(request_id)
            .fetch_optional(db)
            .await?;
    Ok(row.map(|(owner_id, status)| FailureProbe { owner_id, status }))
}
