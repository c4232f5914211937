use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::User;

/// Apply a partial profile update. COALESCE keeps columns the caller did not
/// send; role is never touched here.
pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    name: Option<&str>,
    bio: Option<&str>,
    tech_stack: Option<&[String]>,
    interests: Option<&[String]>,
) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
           SET name       = COALESCE($2, name),
               bio        = COALESCE($3, bio),
               tech_stack = COALESCE($4, tech_stack),
               interests  = COALESCE($5, interests),
               updated_at = now()
         WHERE id = $1
        RETURNING id, email, password_hash, name, role, bio, tech_stack, interests,
                  avatar_key, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(bio)
    .bind(tech_stack)
    .bind(interests)
    .fetch_one(db)
    .await
}

/// Record the storage key of a freshly uploaded avatar, returning the key it
/// replaced so the caller can clean the old object up.
pub async fn set_avatar_key(
    db: &PgPool,
    user_id: Uuid,
    key: &str,
) -> sqlx::Result<Option<String>> {
    let previous: Option<(Option<String>,)> = sqlx::query_as(
        r#"
        UPDATE users u
           SET avatar_key = $2, updated_at = now()
          FROM (SELECT avatar_key FROM users WHERE id = $1) old
         WHERE u.id = $1
        RETURNING old.avatar_key
        "#,
    )
    .bind(user_id)
    .bind(key)
    .fetch_optional(db)
    .await?;
    Ok(previous.and_then(|(k,)| k))
}
