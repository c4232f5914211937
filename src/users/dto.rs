use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Role, RoleProfile, User};

/// Role tag plus the role-specific attribute list, flattened into the
/// profile payload on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleAttributes {
    Mentor { tech_stack: Vec<String> },
    Mentee { interests: Vec<String> },
}

impl RoleAttributes {
    pub fn role(&self) -> Role {
        match self {
            RoleAttributes::Mentor { .. } => Role::Mentor,
            RoleAttributes::Mentee { .. } => Role::Mentee,
        }
    }
}

impl From<RoleProfile> for RoleAttributes {
    fn from(p: RoleProfile) -> Self {
        match p {
            RoleProfile::Mentor { tech_stack } => RoleAttributes::Mentor { tech_stack },
            RoleProfile::Mentee { interests } => RoleAttributes::Mentee { interests },
        }
    }
}

/// Public view of a user, returned from signup, /me and profile updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
    #[serde(flatten)]
    pub attributes: RoleAttributes,
    pub avatar_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl UserProfile {
    pub fn from_user(user: &User, avatar_url: Option<String>) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            bio: user.bio.clone(),
            attributes: user.role_profile().into(),
            avatar_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }

    pub fn role(&self) -> Role {
        self.attributes.role()
    }
}

/// Partial profile update. Role is absent on purpose: it is immutable.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mentor_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "mentor@example.com".into(),
            password_hash: "secret".into(),
            name: "Mentor".into(),
            role: Role::Mentor,
            bio: Some("ten years of Rust".into()),
            tech_stack: Some(vec!["Rust".into(), "Postgres".into()]),
            interests: None,
            avatar_key: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn profile_flattens_role_and_attributes() {
        let profile = UserProfile::from_user(&mentor_user(), None);
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["role"], "mentor");
        assert_eq!(json["tech_stack"][0], "Rust");
        assert!(json.get("interests").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn profile_round_trips() {
        let profile = UserProfile::from_user(&mentor_user(), Some("https://x/y.jpg".into()));
        let json = serde_json::to_string(&profile).unwrap();
        let back: UserProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role(), Role::Mentor);
        assert_eq!(back.avatar_url.as_deref(), Some("https://x/y.jpg"));
    }

    #[test]
    fn update_request_defaults_to_no_changes() {
        let req: UpdateProfileRequest = serde_json::from_str("{}").unwrap();
        assert!(req.name.is_none());
        assert!(req.bio.is_none());
        assert!(req.tech_stack.is_none());
        assert!(req.interests.is_none());
    }
}
