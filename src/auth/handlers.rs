use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, SignupRequest},
        repo::is_unique_violation,
        repo_types::{Role, User},
        services::{hash_password, is_valid_email, verify_password, JwtKeys},
    },
    error::ApiError,
    state::AppState,
    users::dto::UserProfile,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

const MIN_PASSWORD_LEN: usize = 8;

/// Field-level validation for signup. The role-mismatched attribute list is
/// rejected here so a mentee can never smuggle in a tech stack.
fn validate_signup(payload: &SignupRequest) -> Result<(), ApiError> {
    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("invalid email address".into()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name must not be empty".into()));
    }
    match payload.role {
        Role::Mentor => {
            if payload.interests.is_some() {
                return Err(ApiError::Validation(
                    "interests are a mentee attribute".into(),
                ));
            }
        }
        Role::Mentee => {
            if payload.tech_stack.is_some() {
                return Err(ApiError::Validation(
                    "tech_stack is a mentor attribute".into(),
                ));
            }
        }
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.name = payload.name.trim().to_string();
    validate_signup(&payload)?;

    // Pre-check for a friendly error; the unique index on email stays the
    // authority when two signups race.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::DuplicateIdentity);
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        &payload.email,
        &hash,
        &payload.name,
        payload.role,
        payload.tech_stack.as_deref(),
        payload.interests.as_deref(),
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e, "users_email_key") {
            ApiError::DuplicateIdentity
        } else {
            e.into()
        }
    })?;

    info!(user_id = %user.id, email = %user.email, role = ?user.role, "user registered");
    Ok((StatusCode::CREATED, Json(UserProfile::from_user(&user, None))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    // Unknown email and wrong password produce the same response so the
    // endpoint cannot be used to enumerate accounts.
    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse { token }))
}

#[cfg(test)]
mod signup_validation_tests {
    use super::*;

    fn base(role: Role) -> SignupRequest {
        SignupRequest {
            email: "mentee@example.com".into(),
            password: "long-enough".into(),
            name: "Mentee".into(),
            role,
            tech_stack: None,
            interests: None,
        }
    }

    #[test]
    fn accepts_well_formed_signup() {
        assert!(validate_signup(&base(Role::Mentee)).is_ok());
        let mut mentor = base(Role::Mentor);
        mentor.tech_stack = Some(vec!["React".into()]);
        assert!(validate_signup(&mentor).is_ok());
    }

    #[test]
    fn rejects_bad_email() {
        let mut p = base(Role::Mentee);
        p.email = "nope".into();
        assert!(matches!(
            validate_signup(&p),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn rejects_short_password() {
        let mut p = base(Role::Mentee);
        p.password = "short".into();
        assert!(matches!(
            validate_signup(&p),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn rejects_blank_name() {
        let mut p = base(Role::Mentee);
        p.name = "   ".into();
        assert!(matches!(
            validate_signup(&p),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn rejects_role_mismatched_attributes() {
        let mut mentee = base(Role::Mentee);
        mentee.tech_stack = Some(vec!["React".into()]);
        assert!(matches!(
            validate_signup(&mentee),
            Err(ApiError::Validation(_))
        ));

        let mut mentor = base(Role::Mentor);
        mentor.interests = Some(vec!["Frontend".into()]);
        assert!(matches!(
            validate_signup(&mentor),
            Err(ApiError::Validation(_))
        ));
    }
}
