//! User profile service

use chrono::Utc;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        profile::{profile_slug, ProfileDetails, ProfileInput, UserProfile},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ProfilesService {
    repository: Repository,
}

impl ProfilesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Profile page with the copies its owner has on loan
    pub async fn get_profile(&self, slug: &str) -> AppResult<ProfileDetails> {
        let profile = self.repository.profiles.get_by_slug(slug).await?;
        self.details(profile).await
    }

    async fn details(&self, profile: UserProfile) -> AppResult<ProfileDetails> {
        let user = self.repository.users.get_by_id(profile.user_id).await?;
        let today = Utc::now().date_naive();
        let loans = self
            .repository
            .book_instances
            .list_on_loan_to(profile.user_id)
            .await?
            .into_iter()
            .map(|row| row.into_details(today))
            .collect();

        Ok(ProfileDetails {
            display_name: profile.to_string(),
            username: user.username,
            profile,
            loans,
        })
    }

    /// Create the caller's profile and make them a library member
    pub async fn create_profile(&self, user_id: i32, data: ProfileInput) -> AppResult<ProfileDetails> {
        data.validate()?;

        if self.repository.profiles.get_by_user(user_id).await?.is_some() {
            return Err(AppError::Conflict("User already has a profile".to_string()));
        }

        let user = self.repository.users.get_by_id(user_id).await?;
        let slug = profile_slug(None, &user.username);
        if slug.is_empty() {
            return Err(AppError::Validation(format!(
                "Cannot derive a profile slug from username '{}'",
                user.username
            )));
        }

        let profile = self.repository.profiles.create(user_id, &slug, &data).await?;
        tracing::info!("Created profile '{}' for user id={}", profile.slug, user_id);
        self.details(profile).await
    }

    /// Update a profile; only its owner may do so
    pub async fn update_profile(
        &self,
        claims: &UserClaims,
        slug: &str,
        data: ProfileInput,
    ) -> AppResult<ProfileDetails> {
        data.validate()?;
        let profile = self.repository.profiles.get_by_slug(slug).await?;
        if profile.user_id != claims.user_id {
            return Err(AppError::Authorization("Only the owner can edit this profile".to_string()));
        }

        let updated = self.repository.profiles.update(profile.id, &data).await?;
        self.details(updated).await
    }

    /// Delete a profile (owner or librarian); borrowed copies are released
    pub async fn delete_profile(&self, claims: &UserClaims, slug: &str) -> AppResult<()> {
        let profile = self.repository.profiles.get_by_slug(slug).await?;
        if profile.user_id != claims.user_id && !claims.is_librarian() {
            return Err(AppError::Authorization(
                "Only the owner or a librarian can delete this profile".to_string(),
            ));
        }

        let released = self.repository.profiles.delete(&profile).await?;
        tracing::info!(
            "Deleted profile '{}', released {} borrowed copies",
            profile.slug,
            released
        );
        Ok(())
    }
}
