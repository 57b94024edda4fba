//! User profile model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::book_instance::BookInstanceDetails;
use crate::text::slugify;

/// Profile attached one-to-one to a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserProfile {
    pub id: i32,
    pub user_id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// Brief self description
    pub description: Option<String>,
    /// Relative path of the profile picture
    pub picture: Option<String>,
    pub slug: String,
}

impl std::fmt::Display for UserProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}",
            self.last_name.as_deref().unwrap_or_default(),
            self.first_name.as_deref().unwrap_or_default()
        )
    }
}

/// Profile page: profile, owner and the copies they hold
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileDetails {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub username: String,
    pub display_name: String,
    pub loans: Vec<BookInstanceDetails>,
}

/// Create or update profile request.
///
/// The owning user always comes from the authenticated session.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProfileInput {
    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,
    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,
    /// Enter a brief description of you
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    pub picture: Option<String>,
}

/// Slug for a profile: the existing one, or one derived from the username
pub fn profile_slug(existing: Option<&str>, username: &str) -> String {
    match existing.filter(|s| !s.is_empty()) {
        Some(slug) => slug.to_string(),
        None => slugify(username),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_slug() {
        assert_eq!(profile_slug(None, "Jane.Doe 42"), "janedoe-42");
        assert_eq!(profile_slug(Some(""), "jdoe"), "jdoe");
        assert_eq!(profile_slug(Some("custom"), "jdoe"), "custom");
    }

    #[test]
    fn test_display() {
        let profile = UserProfile {
            id: 1,
            user_id: 2,
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            phone: None,
            description: None,
            picture: None,
            slug: "jdoe".to_string(),
        };
        assert_eq!(profile.to_string(), "Doe, Jane");
    }
}
