//! Catalog management service: books, authors, genres and languages

use chrono::Utc;
use validator::Validate;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorDetails, AuthorInput, AuthorShort},
        book::{display_genre, Book, BookDetails, BookInput, BookQuery, BookShort},
        genre::{Genre, GenreInput},
        language::{Language, LanguageInput},
        summary::CatalogSummary,
    },
    repository::{Page, Repository},
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    pub fn page(&self, page: Option<i64>, per_page: Option<i64>) -> Page {
        Page::new(page, per_page, self.config.page_size)
    }

    pub async fn summary(&self) -> AppResult<CatalogSummary> {
        self.repository.books.summary().await
    }

    // Books

    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<BookShort>, i64, Page)> {
        let page = self.page(query.page, query.per_page);
        let (books, total) = self.repository.books.search(query, page).await?;
        Ok((books, total, page))
    }

    /// Book detail page by slug
    pub async fn get_book(&self, slug: &str) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_slug(slug).await?;
        self.book_details(book).await
    }

    async fn book_details(&self, book: Book) -> AppResult<BookDetails> {
        let author = match book.author_id {
            Some(id) => Some(AuthorShort::from(&self.repository.authors.get_by_id(id).await?)),
            None => None,
        };
        let language = match book.language_id {
            Some(id) => Some(self.repository.languages.get_by_id(id).await?),
            None => None,
        };
        let genres = self.repository.books.genres(book.id).await?;

        let today = Utc::now().date_naive();
        let instances = self
            .repository
            .book_instances
            .list_for_book(book.id)
            .await?
            .into_iter()
            .map(|row| row.into_details(today))
            .collect();

        Ok(BookDetails {
            display_genre: display_genre(&genres),
            book,
            author,
            language,
            genres,
            instances,
        })
    }

    pub async fn create_book(&self, mut data: BookInput) -> AppResult<BookDetails> {
        data.validate()?;
        let author = self.check_book_references(&mut data).await?;

        let slug = data.resolve_slug(author.as_ref());
        if slug.is_empty() {
            return Err(AppError::Validation(
                "slug: could not derive a slug from the title, provide one".to_string(),
            ));
        }

        let book = self.repository.books.create(&data, &slug).await?;
        tracing::info!("Created book '{}' (id={}, slug={})", book.title, book.id, book.slug);
        self.book_details(book).await
    }

    /// Update a book. The stored slug is kept unless a new one is given.
    pub async fn update_book(&self, slug: &str, mut data: BookInput) -> AppResult<BookDetails> {
        data.validate()?;
        let existing = self.repository.books.get_by_slug(slug).await?;
        self.check_book_references(&mut data).await?;

        let new_slug = match data.explicit_slug() {
            Some(s) => s.to_string(),
            None => existing.slug.clone(),
        };

        let book = self.repository.books.update(existing.id, &data, &new_slug).await?;
        tracing::info!("Updated book '{}' (id={})", book.title, book.id);
        self.book_details(book).await
    }

    pub async fn delete_book(&self, slug: &str) -> AppResult<()> {
        let book = self.repository.books.get_by_slug(slug).await?;
        self.repository.books.delete(book.id).await.map_err(|e| match e {
            AppError::StillReferenced(_) => AppError::StillReferenced(format!(
                "Book '{}' still has copies; delete them first",
                book.title
            )),
            other => other,
        })?;
        tracing::info!("Deleted book '{}' (id={})", book.title, book.id);
        Ok(())
    }

    /// Check author, language and genre choices; returns the author.
    /// Duplicate genre IDs are dropped, keeping the first occurrence.
    async fn check_book_references(&self, data: &mut BookInput) -> AppResult<Option<Author>> {
        let author = match data.author_id {
            Some(id) => Some(
                self.repository
                    .authors
                    .get_by_id(id)
                    .await
                    .map_err(|e| not_found_as_invalid(e, "author_id", id))?,
            ),
            None => None,
        };

        if let Some(id) = data.language_id {
            self.repository
                .languages
                .get_by_id(id)
                .await
                .map_err(|e| not_found_as_invalid(e, "language_id", id))?;
        }

        let mut seen = std::collections::HashSet::new();
        data.genre_ids.retain(|id| seen.insert(*id));

        if !data.genre_ids.is_empty() {
            let found = self.repository.genres.find_many(&data.genre_ids).await?;
            if let Some(missing) = data
                .genre_ids
                .iter()
                .find(|id| !found.iter().any(|g| g.id == **id))
            {
                return Err(AppError::Validation(format!(
                    "genre_ids: select a valid choice, {} is not one of the available choices",
                    missing
                )));
            }
        }

        Ok(author)
    }

    // Authors

    pub async fn list_authors(&self, page: Page) -> AppResult<(Vec<Author>, i64)> {
        self.repository.authors.list(page).await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.authors.books(id).await?;
        Ok(AuthorDetails {
            display_name: author.to_string(),
            author,
            books,
        })
    }

    pub async fn create_author(&self, data: AuthorInput) -> AppResult<Author> {
        data.validate()?;
        let author = self.repository.authors.create(&data).await?;
        tracing::info!("Created author '{}' (id={})", author, author.id);
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, data: AuthorInput) -> AppResult<Author> {
        data.validate()?;
        self.repository.authors.update(id, &data).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!("Deleted author id={}", id);
        Ok(())
    }

    // Genres

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        self.repository.genres.get_by_id(id).await
    }

    pub async fn create_genre(&self, data: GenreInput) -> AppResult<Genre> {
        data.validate()?;
        self.repository.genres.create(&data).await
    }

    pub async fn update_genre(&self, id: i32, data: GenreInput) -> AppResult<Genre> {
        data.validate()?;
        self.repository.genres.update(id, &data).await
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete(id).await
    }

    // Languages

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.languages.list().await
    }

    pub async fn get_language(&self, id: i32) -> AppResult<Language> {
        self.repository.languages.get_by_id(id).await
    }

    pub async fn create_language(&self, data: LanguageInput) -> AppResult<Language> {
        data.validate()?;
        self.repository.languages.create(&data).await
    }

    pub async fn update_language(&self, id: i32, data: LanguageInput) -> AppResult<Language> {
        data.validate()?;
        self.repository.languages.update(id, &data).await
    }

    pub async fn delete_language(&self, id: i32) -> AppResult<()> {
        self.repository.languages.delete(id).await
    }
}

/// A dangling reference in a request body is a bad form value, not a 404
fn not_found_as_invalid(err: AppError, field: &str, id: i32) -> AppError {
    match err {
        AppError::NotFound(_) => AppError::Validation(format!(
            "{}: select a valid choice, {} is not one of the available choices",
            field, id
        )),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_becomes_validation() {
        let err = not_found_as_invalid(AppError::NotFound("Author 9".into()), "author_id", 9);
        match err {
            AppError::Validation(msg) => assert!(msg.starts_with("author_id: select a valid choice")),
            other => panic!("unexpected: {:?}", other),
        }
        let err = not_found_as_invalid(AppError::Internal("x".into()), "author_id", 9);
        assert!(matches!(err, AppError::Internal(_)));
    }
}
