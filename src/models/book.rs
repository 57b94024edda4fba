//! Book (catalog title) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::{
    author::{Author, AuthorShort},
    book_instance::BookInstanceDetails,
    genre::Genre,
    language::Language,
};
use crate::text::slugify;

/// Number of genres shown by [`display_genre`]
const DISPLAY_GENRE_COUNT: usize = 3;

/// Full book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    /// Brief description of the book
    pub summary: String,
    /// Publication date
    pub pubdate: NaiveDate,
    /// 13 character ISBN number, unique
    pub isbn: String,
    pub author_id: Option<i32>,
    pub language_id: Option<i32>,
    /// URL slug, unique
    pub slug: String,
    /// Relative path of the cover image
    pub cover: Option<String>,
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub pubdate: NaiveDate,
    pub isbn: String,
    /// "Last, First" of the author, if any
    pub author_name: Option<String>,
}

/// Book detail page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub author: Option<AuthorShort>,
    pub language: Option<Language>,
    pub genres: Vec<Genre>,
    /// First genres joined with ", "
    pub display_genre: String,
    pub instances: Vec<BookInstanceDetails>,
}

/// Book list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Case-insensitive title search
    pub title: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create or update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    /// Enter a brief description of the book
    #[validate(length(min = 1, max = 1000, message = "Summary must be 1 to 1000 characters"))]
    pub summary: String,
    pub pubdate: NaiveDate,
    #[validate(custom(function = "validate_isbn"))]
    pub isbn: String,
    pub author_id: Option<i32>,
    pub language_id: Option<i32>,
    /// Genre IDs for this book
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    /// Derived from title and author when omitted
    #[validate(
        length(max = 255, message = "Slug must be at most 255 characters"),
        custom(function = "validate_slug")
    )]
    pub slug: Option<String>,
    pub cover: Option<String>,
}

impl BookInput {
    /// Slug to store for this book.
    ///
    /// An explicit slug always wins. Otherwise the slug is derived from
    /// `title-FirstLast`, or from the title alone when the book has no author.
    pub fn resolve_slug(&self, author: Option<&Author>) -> String {
        match self.explicit_slug() {
            Some(slug) => slug.to_string(),
            None => book_slug(&self.title, author),
        }
    }

    /// The slug given in the request, if any. A blank slug counts as unset.
    pub fn explicit_slug(&self) -> Option<&str> {
        self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Slug derived from the title and author names
pub fn book_slug(title: &str, author: Option<&Author>) -> String {
    match author {
        Some(a) => slugify(&format!("{}-{}{}", title, a.first_name, a.last_name)),
        None => slugify(title),
    }
}

/// Names of the first genres joined by ", "
pub fn display_genre(genres: &[Genre]) -> String {
    genres
        .iter()
        .take(DISPLAY_GENRE_COUNT)
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Blank, or letters, digits, `-` and `_` only
fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.trim().is_empty() {
        return Ok(());
    }
    if !slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        let mut err = ValidationError::new("slug");
        err.message = Some("Slug may only contain letters, numbers, underscores or hyphens".into());
        return Err(err);
    }
    Ok(())
}

fn validate_isbn(isbn: &str) -> Result<(), ValidationError> {
    let len = isbn.chars().count();
    if len == 0 || len > 13 || !isbn.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("isbn");
        err.message = Some("ISBN must be up to 13 digits".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Author {
        Author {
            id: 7,
            first_name: "Frank".to_string(),
            last_name: "Herbert".to_string(),
            date_of_birth: None,
            date_of_death: None,
            photo: None,
        }
    }

    fn input(slug: Option<&str>) -> BookInput {
        BookInput {
            title: "Dune".to_string(),
            summary: "Spice.".to_string(),
            pubdate: NaiveDate::from_ymd_opt(1965, 8, 1).unwrap(),
            isbn: "9780441013593".to_string(),
            author_id: Some(7),
            language_id: None,
            genre_ids: vec![],
            slug: slug.map(str::to_string),
            cover: None,
        }
    }

    #[test]
    fn test_slug_from_title_and_author() {
        assert_eq!(input(None).resolve_slug(Some(&author())), "dune-frankherbert");
        assert_eq!(input(None).resolve_slug(None), "dune");
        assert_eq!(input(Some("  ")).resolve_slug(Some(&author())), "dune-frankherbert");
    }

    #[test]
    fn test_existing_slug_is_kept() {
        let book = input(Some("my-dune"));
        assert_eq!(book.resolve_slug(Some(&author())), "my-dune");
        assert_eq!(book.resolve_slug(None), "my-dune");
    }

    #[test]
    fn test_explicit_slug_alphabet() {
        assert!(input(Some("dune_1965-herbert")).validate().is_ok());
        assert!(input(Some("")).validate().is_ok());
        assert!(input(Some(" My Dune/Part 2! ")).validate().is_err());
        assert!(input(Some("my dune")).validate().is_err());
        assert!(input(Some("dünë")).validate().is_err());
    }

    #[test]
    fn test_explicit_slug_is_trimmed() {
        assert_eq!(input(Some("  ")).explicit_slug(), None);
        assert_eq!(input(Some("my-dune")).explicit_slug(), Some("my-dune"));
        assert_eq!(input(None).explicit_slug(), None);
    }

    #[test]
    fn test_display_genre_takes_three() {
        let genres: Vec<Genre> = ["Sci-Fi", "Classic", "Adventure", "Politics"]
            .iter()
            .enumerate()
            .map(|(i, n)| Genre { id: i as i32, name: n.to_string() })
            .collect();
        assert_eq!(display_genre(&genres), "Sci-Fi, Classic, Adventure");
        assert_eq!(display_genre(&genres[..1]), "Sci-Fi");
        assert_eq!(display_genre(&[]), "");
    }

    #[test]
    fn test_isbn_validation() {
        assert!(validate_isbn("9780441013593").is_ok());
        assert!(validate_isbn("0441013593").is_ok());
        assert!(validate_isbn("044101359X").is_err());
        assert!(validate_isbn("").is_err());
        assert!(validate_isbn("97804410135930").is_err());
        assert!(validate_isbn("978-0441013593").is_err());
        assert!(validate_isbn("X441013593").is_err());
    }

    #[test]
    fn test_input_validation() {
        assert!(input(None).validate().is_ok());
        let mut book = input(None);
        book.summary = "s".repeat(1001);
        assert!(book.validate().is_err());
    }
}
