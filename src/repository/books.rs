//! Books repository for database operations

use sqlx::{Pool, Postgres, Transaction};

use super::Page;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookInput, BookQuery, BookShort},
        genre::Genre,
        summary::CatalogSummary,
    },
};

const BOOK_COLUMNS: &str = "id, title, summary, pubdate, isbn, author_id, language_id, slug, cover";

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search books by title, ordered by title then newest publication
    pub async fn search(&self, query: &BookQuery, page: Page) -> AppResult<(Vec<BookShort>, i64)> {
        let title = query
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| contains_pattern(&t.to_lowercase()));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE ($1::text IS NULL OR LOWER(title) LIKE $1 ESCAPE '\\')",
        )
        .bind(&title)
        .fetch_one(&self.pool)
        .await?;

        let books = sqlx::query_as::<_, BookShort>(
            r#"
            SELECT b.id, b.title, b.slug, b.pubdate, b.isbn,
                   a.last_name || ', ' || a.first_name AS author_name
            FROM books b
            LEFT JOIN authors a ON a.id = b.author_id
            WHERE ($1::text IS NULL OR LOWER(b.title) LIKE $1 ESCAPE '\')
            ORDER BY b.title, b.pubdate DESC, b.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&title)
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((books, total))
    }

    pub async fn get_by_slug(&self, slug: &str) -> AppResult<Book> {
        let query = format!("SELECT {} FROM books WHERE slug = $1", BOOK_COLUMNS);
        sqlx::query_as::<_, Book>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book '{}' not found", slug)))
    }

    /// Genres of a book in the order they were assigned
    pub async fn genres(&self, book_id: i32) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.id, g.name
            FROM book_genres bg
            JOIN genres g ON g.id = bg.genre_id
            WHERE bg.book_id = $1
            ORDER BY bg.position, g.name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    /// Insert a book and its genre links
    pub async fn create(&self, data: &BookInput, slug: &str) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            INSERT INTO books (title, summary, pubdate, isbn, author_id, language_id, slug, cover)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(data.title.trim())
            .bind(data.summary.trim())
            .bind(data.pubdate)
            .bind(&data.isbn)
            .bind(data.author_id)
            .bind(data.language_id)
            .bind(slug)
            .bind(&data.cover)
            .fetch_one(&mut *tx)
            .await?;

        Self::set_genres(&mut tx, book.id, &data.genre_ids).await?;
        tx.commit().await?;

        Ok(book)
    }

    /// Replace a book's fields and genre links
    pub async fn update(&self, id: i32, data: &BookInput, slug: &str) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            r#"
            UPDATE books
            SET title = $1, summary = $2, pubdate = $3, isbn = $4, author_id = $5,
                language_id = $6, slug = $7, cover = $8
            WHERE id = $9
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(data.title.trim())
            .bind(data.summary.trim())
            .bind(data.pubdate)
            .bind(&data.isbn)
            .bind(data.author_id)
            .bind(data.language_id)
            .bind(slug)
            .bind(&data.cover)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;

        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        Self::set_genres(&mut tx, id, &data.genre_ids).await?;
        tx.commit().await?;

        Ok(book)
    }

    async fn set_genres(
        tx: &mut Transaction<'_, Postgres>,
        book_id: i32,
        genre_ids: &[i32],
    ) -> AppResult<()> {
        if genre_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            r#"
            INSERT INTO book_genres (book_id, genre_id, position)
            SELECT $1, g.id, g.ord::int
            FROM UNNEST($2::int4[]) WITH ORDINALITY AS g(id, ord)
            "#,
        )
        .bind(book_id)
        .bind(genre_ids)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Delete a book. Fails while copies of it exist.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book {} not found", id)));
        }
        Ok(())
    }

    /// Counters for the catalog home page
    pub async fn summary(&self) -> AppResult<CatalogSummary> {
        let summary = sqlx::query_as::<_, CatalogSummary>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM books) AS num_books,
                (SELECT COUNT(*) FROM book_instances) AS num_instances,
                (SELECT COUNT(*) FROM book_instances WHERE status = 'a') AS num_instances_available,
                (SELECT COUNT(*) FROM authors) AS num_authors,
                (SELECT COUNT(*) FROM genres) AS num_genres
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }
}

/// `LIKE` pattern matching `text` anywhere, with wildcards in `text` escaped
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("dune"), "%dune%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }
}
