//! Catalog home page counters

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CatalogSummary {
    pub num_books: i64,
    pub num_instances: i64,
    /// Copies with status "available"
    pub num_instances_available: i64,
    pub num_authors: i64,
    pub num_genres: i64,
}
