use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::services::CurrentUser,
    error::ApiError,
    state::AppState,
    users::{
        dto::{UpdateProfileRequest, UserProfile},
        repo,
        services::{avatar_url, validate_image, validate_update},
    },
};

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).put(update_me))
        .route("/me/profile-image", post(upload_profile_image))
        // above the 1 MiB image ceiling; oversize uploads hit validation
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserProfile>, ApiError> {
    let url = avatar_url(&state, &user).await;
    Ok(Json(UserProfile::from_user(&user, url)))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    validate_update(user.role, &payload)?;

    let updated = repo::update_profile(
        &state.db,
        user.id,
        payload.name.as_deref().map(str::trim),
        payload.bio.as_deref(),
        payload.tech_stack.as_deref(),
        payload.interests.as_deref(),
    )
    .await?;

    info!(user_id = %updated.id, "profile updated");
    let url = avatar_url(&state, &updated).await;
    Ok(Json(UserProfile::from_user(&updated, url)))
}

#[instrument(skip(state, user, mp), fields(user_id = %user.id))]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut mp: Multipart,
) -> Result<Json<UserProfile>, ApiError> {
    let mut upload = None;
    while let Ok(Some(field)) = mp.next_field().await {
        if field.name() == Some("file") {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("unreadable upload: {e}")))?;
            upload = Some((content_type, data));
            break;
        }
    }
    let Some((content_type, data)) = upload else {
        return Err(ApiError::Validation("file field is required".into()));
    };

    // Whitelist and size ceiling apply before anything touches storage.
    validate_image(&content_type, data.len())?;

    let key = state.storage.put_avatar(user.id, data, &content_type).await?;
    let previous = repo::set_avatar_key(&state.db, user.id, &key).await?;

    if let Some(old) = previous {
        if let Err(e) = state.storage.remove_avatar(&old).await {
            warn!(error = %e, key = %old, "failed to remove replaced avatar");
        }
    }

    let updated = crate::auth::repo_types::User::find_by_id(&state.db, user.id)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    info!(user_id = %user.id, key = %key, "profile image uploaded");
    let url = avatar_url(&state, &updated).await;
    Ok(Json(UserProfile::from_user(&updated, url)))
}
