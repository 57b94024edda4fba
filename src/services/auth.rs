//! Account and authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateGroups, User, UserClaims, UserInfo},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new account
    pub async fn signup(&self, data: CreateUser) -> AppResult<User> {
        data.validate()?;

        let username = data.username.trim();
        if self.repository.users.username_exists(username).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let hash = hash_password(&data.password)?;
        let user = self.repository.users.create(username, &hash).await?;
        tracing::info!("Registered user '{}' (id={})", user.username, user.id);
        Ok(user)
    }

    /// Create the configured superuser if it does not exist yet
    pub async fn ensure_superuser(&self) -> AppResult<()> {
        let (Some(username), Some(password)) = (&self.config.admin_username, &self.config.admin_password)
        else {
            return Ok(());
        };

        if self.repository.users.username_exists(username).await? {
            tracing::debug!("Superuser '{}' already exists", username);
            return Ok(());
        }

        let hash = hash_password(password)?;
        let user = self.repository.users.create_superuser(username, &hash).await?;
        tracing::info!("Created superuser '{}' (id={})", user.username, user.id);
        Ok(())
    }

    /// Replace a user's groups (superuser only)
    pub async fn set_groups(&self, claims: &UserClaims, user_id: i32, data: UpdateGroups) -> AppResult<UserInfo> {
        claims.require_superuser()?;
        self.repository.users.get_by_id(user_id).await?;

        let mut groups = data.groups;
        groups.sort();
        groups.dedup();

        self.repository.users.set_groups(user_id, &groups).await?;
        tracing::info!("User {} groups set to {:?}", user_id, groups);
        self.user_info(user_id).await
    }

    /// Authenticate by username and password and return a JWT token
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_username(username.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !verify_password(&user.password, password)? {
            tracing::info!("Failed login for '{}'", user.username);
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let permissions = self.repository.users.permissions(user.id).await?;

        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            is_superuser: user.is_superuser,
            permissions,
            exp,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user))
    }

    /// Current user with groups, permissions and profile link
    pub async fn user_info(&self, user_id: i32) -> AppResult<UserInfo> {
        let user = self.repository.users.get_by_id(user_id).await?;
        let groups = self.repository.users.groups(user_id).await?;
        let permissions = self.repository.users.permissions(user_id).await?;
        let profile = self.repository.profiles.get_by_user(user_id).await?;

        Ok(UserInfo {
            id: user.id,
            username: user.username,
            is_superuser: user.is_superuser,
            groups,
            permissions,
            profile_slug: profile.map(|p| p.slug),
        })
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "correct horse").unwrap());
        assert!(!verify_password(&hash, "battery staple").unwrap());
    }

    #[test]
    fn test_invalid_hash_is_internal_error() {
        assert!(matches!(
            verify_password("not-a-hash", "x"),
            Err(AppError::Internal(_))
        ));
    }
}
