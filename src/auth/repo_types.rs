use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// The two fixed user roles. Immutable once set at signup; adding a third
/// role is a compile-time-visible change everywhere this is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Mentor,
    Mentee,
}

/// Role-specific profile payload. Mentors carry an ordered tech stack,
/// mentees their interests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleProfile {
    Mentor { tech_stack: Vec<String> },
    Mentee { interests: Vec<String> },
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, never exposed in JSON
    pub name: String,
    pub role: Role,
    pub bio: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
    pub avatar_key: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    /// The role-appropriate attribute list as a closed tagged value.
    /// A mentor row never surfaces interests and vice versa, regardless of
    /// what the columns hold.
    pub fn role_profile(&self) -> RoleProfile {
        match self.role {
            Role::Mentor => RoleProfile::Mentor {
                tech_stack: self.tech_stack.clone().unwrap_or_default(),
            },
            Role::Mentee => RoleProfile::Mentee {
                interests: self.interests.clone().unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@b.co".into(),
            password_hash: "hash".into(),
            name: "A".into(),
            role,
            bio: None,
            tech_stack: Some(vec!["React".into()]),
            interests: Some(vec!["Backend".into()]),
            avatar_key: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Mentor).unwrap(), "\"mentor\"");
        assert_eq!(serde_json::to_string(&Role::Mentee).unwrap(), "\"mentee\"");
        let parsed: Role = serde_json::from_str("\"mentee\"").unwrap();
        assert_eq!(parsed, Role::Mentee);
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
    }

    #[test]
    fn role_profile_only_surfaces_matching_attribute() {
        let mentor = user_with_role(Role::Mentor);
        assert_eq!(
            mentor.role_profile(),
            RoleProfile::Mentor {
                tech_stack: vec!["React".into()]
            }
        );
        let mentee = user_with_role(Role::Mentee);
        assert_eq!(
            mentee.role_profile(),
            RoleProfile::Mentee {
                interests: vec!["Backend".into()]
            }
        );
    }

    #[test]
    fn password_hash_never_serialized() {
        let user = user_with_role(Role::Mentor);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("hash"));
    }
}
