//! Data models for the library catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod language;
pub mod profile;
pub mod summary;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorShort};
pub use book::{Book, BookDetails, BookShort};
pub use book_instance::{BookInstance, BookInstanceDetails, LoanStatus};
pub use genre::Genre;
pub use language::Language;
pub use profile::UserProfile;
pub use summary::CatalogSummary;
pub use user::{Permission, User, UserClaims};
