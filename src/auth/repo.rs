use crate::auth::repo_types::{Role, User};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password_hash, name, role, bio, tech_stack, interests, \
                            avatar_key, created_at, updated_at";

impl User {
    /// Find a user by email (stored lowercased).
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Find a user by id only if they hold the given role.
    pub async fn find_by_id_with_role(
        db: &PgPool,
        id: Uuid,
        role: Role,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND role = $2"
        ))
        .bind(id)
        .bind(role)
        .fetch_optional(db)
        .await
    }

    /// Insert a new user. The unique index on email is the authority on
    /// duplicates; callers map that violation to the duplicate-identity error.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        name: &str,
        role: Role,
        tech_stack: Option<&[String]>,
        interests: Option<&[String]>,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, role, tech_stack, interests)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(role)
        .bind(tech_stack)
        .bind(interests)
        .fetch_one(db)
        .await
    }
}

/// True when the error is a violation of the named unique constraint.
pub fn is_unique_violation(e: &sqlx::Error, constraint: &str) -> bool {
    match e {
        sqlx::Error::Database(db) => db.constraint() == Some(constraint),
        _ => false,
    }
}
