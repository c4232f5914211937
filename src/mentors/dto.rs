use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::repo_types::{RoleProfile, User};

/// Query parameters for the mentor listing.
#[derive(Debug, Default, Deserialize)]
pub struct MentorQuery {
    /// Case-insensitive substring match on the mentor's name.
    #[serde(default)]
    pub search: Option<String>,
    /// Exact element match against the mentor's tech stack.
    #[serde(default)]
    pub tech_stack: Option<String>,
    #[serde(default)]
    pub sort_by: MentorSort,
}

/// Sort key for the listing. Ties always break on id so identical queries
/// return identical order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentorSort {
    #[default]
    Name,
    TechStack,
}

impl MentorSort {
    pub fn order_clause(self) -> &'static str {
        match self {
            MentorSort::Name => "name ASC, id ASC",
            MentorSort::TechStack => "tech_stack[1] ASC NULLS LAST, id ASC",
        }
    }
}

/// One row of the mentor listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorListItem {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
    pub tech_stack: Vec<String>,
    pub avatar_url: Option<String>,
}

impl MentorListItem {
    pub fn from_user(user: &User, avatar_url: Option<String>) -> Self {
        let tech_stack = match user.role_profile() {
            RoleProfile::Mentor { tech_stack } => tech_stack,
            // Listing queries filter on role = mentor already.
            RoleProfile::Mentee { .. } => Vec::new(),
        };
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            bio: user.bio.clone(),
            tech_stack,
            avatar_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_parses_and_defaults() {
        let q: MentorQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.sort_by, MentorSort::Name);
        let q: MentorQuery = serde_json::from_str(r#"{"sort_by":"tech_stack"}"#).unwrap();
        assert_eq!(q.sort_by, MentorSort::TechStack);
        assert!(serde_json::from_str::<MentorQuery>(r#"{"sort_by":"rating"}"#).is_err());
    }

    #[test]
    fn order_clauses_always_tie_break_on_id() {
        assert!(MentorSort::Name.order_clause().ends_with("id ASC"));
        assert!(MentorSort::TechStack.order_clause().ends_with("id ASC"));
    }
}
