use crate::auth::repo_types::{Role, User};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::UpdateProfileRequest;

/// Types accepted for profile images. Enforced here, server-side, no matter
/// what any client-side check claimed.
pub const ALLOWED_IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/png"];
/// Hard ceiling on an uploaded profile image.
pub const MAX_IMAGE_BYTES: usize = 1024 * 1024;

const AVATAR_URL_TTL_SECS: u64 = 30 * 60;

/// Reject unsupported types and oversize payloads before any storage write.
pub fn validate_image(content_type: &str, len: usize) -> Result<(), ApiError> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(ApiError::Validation(
            "only jpeg and png images are allowed".into(),
        ));
    }
    if len > MAX_IMAGE_BYTES {
        return Err(ApiError::Validation(
            "image must be at most 1 MiB".into(),
        ));
    }
    Ok(())
}

/// Field validation for a partial profile update against the caller's role.
pub fn validate_update(role: Role, req: &UpdateProfileRequest) -> Result<(), ApiError> {
    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("name must not be empty".into()));
        }
    }
    match role {
        Role::Mentor => {
            if req.interests.is_some() {
                return Err(ApiError::Validation(
                    "interests are a mentee attribute".into(),
                ));
            }
        }
        Role::Mentee => {
            if req.tech_stack.is_some() {
                return Err(ApiError::Validation(
                    "tech_stack is a mentor attribute".into(),
                ));
            }
        }
    }
    Ok(())
}

/// Presigned URL for the user's avatar, if one is stored.
pub async fn avatar_url(state: &AppState, user: &User) -> Option<String> {
    let key = user.avatar_key.as_deref()?;
    match state.storage.presign_get(key, AVATAR_URL_TTL_SECS).await {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(error = %e, user_id = %user.id, "presign avatar failed");
            None
        }
    }
}
