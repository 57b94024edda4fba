//! Book instances (copies) repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book_instance::{BookInstanceInput, BookInstanceRow, LoanStatus},
};

const INSTANCE_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, bi.imprint, bi.due_back, bi.status, bi.borrower_id,
           b.title AS book_title, b.slug AS book_slug, u.username AS borrower_username
    FROM book_instances bi
    JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstanceRow> {
        let query = format!("{} WHERE bi.id = $1", INSTANCE_SELECT);
        sqlx::query_as::<_, BookInstanceRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Copies of a book
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstanceRow>> {
        let query = format!(
            "{} WHERE bi.book_id = $1 ORDER BY bi.status, bi.due_back NULLS LAST, bi.imprint",
            INSTANCE_SELECT
        );
        let rows = sqlx::query_as::<_, BookInstanceRow>(&query)
            .bind(book_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Copies currently on loan to a user, soonest due first
    pub async fn list_on_loan_to(&self, user_id: i32) -> AppResult<Vec<BookInstanceRow>> {
        let query = format!(
            "{} WHERE bi.borrower_id = $1 AND bi.status = $2 ORDER BY bi.due_back NULLS LAST",
            INSTANCE_SELECT
        );
        let rows = sqlx::query_as::<_, BookInstanceRow>(&query)
            .bind(user_id)
            .bind(LoanStatus::OnLoan)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Every copy on loan, soonest due first
    pub async fn list_on_loan(&self) -> AppResult<Vec<BookInstanceRow>> {
        let query = format!(
            "{} WHERE bi.status = $1 ORDER BY bi.due_back NULLS LAST, b.title",
            INSTANCE_SELECT
        );
        let rows = sqlx::query_as::<_, BookInstanceRow>(&query)
            .bind(LoanStatus::OnLoan)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, book_id: i32, data: &BookInstanceInput) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, due_back, status, borrower_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(book_id)
        .bind(data.imprint.trim())
        .bind(data.due_back)
        .bind(data.status)
        .bind(data.borrower_id)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn update(&self, id: Uuid, data: &BookInstanceInput) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE book_instances
            SET imprint = $1, due_back = $2, status = $3, borrower_id = $4
            WHERE id = $5
            "#,
        )
        .bind(data.imprint.trim())
        .bind(data.due_back)
        .bind(data.status)
        .bind(data.borrower_id)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }

    /// Put a copy on loan to `borrower_id` until `due_back`
    pub async fn lend(&self, id: Uuid, borrower_id: i32, due_back: NaiveDate) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE book_instances SET due_back = $1, borrower_id = $2, status = $3 WHERE id = $4",
        )
        .bind(due_back)
        .bind(borrower_id)
        .bind(LoanStatus::OnLoan)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }

    /// Make a copy available again
    pub async fn mark_returned(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE book_instances SET due_back = NULL, borrower_id = NULL, status = $1 WHERE id = $2",
        )
        .bind(LoanStatus::Available)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }
}
