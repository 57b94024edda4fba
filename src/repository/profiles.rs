//! User profiles repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::LoanStatus,
        profile::{ProfileInput, UserProfile},
        user::LIBRARY_MEMBER_GROUP,
    },
};

const PROFILE_COLUMNS: &str =
    "id, user_id, first_name, last_name, phone, description, picture, slug";

#[derive(Clone)]
pub struct ProfilesRepository {
    pool: Pool<Postgres>,
}

impl ProfilesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_slug(&self, slug: &str) -> AppResult<UserProfile> {
        let query = format!("SELECT {} FROM user_profiles WHERE slug = $1", PROFILE_COLUMNS);
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile '{}' not found", slug)))
    }

    pub async fn get_by_user(&self, user_id: i32) -> AppResult<Option<UserProfile>> {
        let query = format!("SELECT {} FROM user_profiles WHERE user_id = $1", PROFILE_COLUMNS);
        let profile = sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    /// Create a profile and enroll its owner in the library member group
    pub async fn create(&self, user_id: i32, slug: &str, data: &ProfileInput) -> AppResult<UserProfile> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            INSERT INTO user_profiles (user_id, first_name, last_name, phone, description, picture, slug)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );
        let profile = sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.phone)
            .bind(&data.description)
            .bind(&data.picture)
            .bind(slug)
            .fetch_one(&mut *tx)
            .await?;

        let enrolled = sqlx::query(
            r#"
            INSERT INTO user_groups (user_id, group_id)
            SELECT $1, id FROM groups WHERE name = $2
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(LIBRARY_MEMBER_GROUP)
        .execute(&mut *tx)
        .await?;

        if enrolled.rows_affected() == 0 {
            tracing::debug!("User {} already in group '{}'", user_id, LIBRARY_MEMBER_GROUP);
        }

        tx.commit().await?;
        Ok(profile)
    }

    /// Update descriptive fields; the slug and owner never change
    pub async fn update(&self, id: i32, data: &ProfileInput) -> AppResult<UserProfile> {
        let query = format!(
            r#"
            UPDATE user_profiles
            SET first_name = $1, last_name = $2, phone = $3, description = $4, picture = $5
            WHERE id = $6
            RETURNING {}
            "#,
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.phone)
            .bind(&data.description)
            .bind(&data.picture)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", id)))
    }

    /// Delete a profile, releasing every copy its owner had borrowed.
    /// Returns the number of released copies.
    pub async fn delete(&self, profile: &UserProfile) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let released = sqlx::query(
            r#"
            UPDATE book_instances
            SET status = $1, borrower_id = NULL, due_back = NULL
            WHERE borrower_id = $2
            "#,
        )
        .bind(LoanStatus::Available)
        .bind(profile.user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let result = sqlx::query("DELETE FROM user_profiles WHERE id = $1")
            .bind(profile.id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Profile {} not found", profile.id)));
        }

        tx.commit().await?;
        Ok(released)
    }
}
