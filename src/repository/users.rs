//! Users and permission groups repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{Permission, User},
};

const USER_COLUMNS: &str = "id, username, password, is_superuser, date_joined";

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Case-insensitive lookup used for authentication
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let query = format!(
            "SELECT {} FROM users WHERE LOWER(username) = LOWER($1)",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn create(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let query = format!(
            "INSERT INTO users (username, password) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn create_superuser(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let query = format!(
            "INSERT INTO users (username, password, is_superuser) VALUES ($1, $2, TRUE) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    /// Replace the user's groups. Fails on an unknown group name.
    pub async fn set_groups(&self, user_id: i32, groups: &[String]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let known: Vec<String> = sqlx::query_scalar("SELECT name FROM groups WHERE name = ANY($1)")
            .bind(groups)
            .fetch_all(&mut *tx)
            .await?;
        if let Some(unknown) = groups.iter().find(|g| !known.contains(g)) {
            return Err(AppError::Validation(format!("groups: unknown group '{}'", unknown)));
        }

        sqlx::query("DELETE FROM user_groups WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO user_groups (user_id, group_id)
            SELECT $1, id FROM groups WHERE name = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(groups)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Names of the groups a user belongs to
    pub async fn groups(&self, user_id: i32) -> AppResult<Vec<String>> {
        let groups = sqlx::query_scalar::<_, String>(
            r#"
            SELECT g.name
            FROM user_groups ug
            JOIN groups g ON g.id = ug.group_id
            WHERE ug.user_id = $1
            ORDER BY g.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    /// Permissions granted through the user's groups
    pub async fn permissions(&self, user_id: i32) -> AppResult<Vec<Permission>> {
        let codenames = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT gp.codename
            FROM user_groups ug
            JOIN group_permissions gp ON gp.group_id = ug.group_id
            WHERE ug.user_id = $1
            ORDER BY gp.codename
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(codenames
            .iter()
            .filter_map(|c| match c.parse::<Permission>() {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!("Ignoring group permission: {}", e);
                    None
                }
            })
            .collect())
    }

    /// Usernames that can borrow books: users owning a profile
    pub async fn borrower_choices(&self) -> AppResult<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT u.username
            FROM users u
            JOIN user_profiles p ON p.user_id = u.id
            ORDER BY u.username
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    /// Whether the user owns a profile and so may borrow
    pub async fn is_borrower(&self, user_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_profiles WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// ID of a user owning a profile, by exact username
    pub async fn borrower_id(&self, username: &str) -> AppResult<Option<i32>> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT u.id
            FROM users u
            JOIN user_profiles p ON p.user_id = u.id
            WHERE u.username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }
}
