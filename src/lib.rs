//! LocalLibrary Server
//!
//! REST JSON API for a small local library: catalog of books, authors,
//! genres and languages, physical copies with loans, and member profiles.

use std::sync::Arc;

use sqlx::PgPool;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod text;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: PgPool,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build repositories and services on top of a connection pool
    pub fn new(config: AppConfig, pool: PgPool) -> Self {
        let repository = repository::Repository::new(pool.clone());
        let services = services::Services::new(repository, config.auth.clone(), config.catalog.clone());

        Self {
            config: Arc::new(config),
            pool,
            services: Arc::new(services),
        }
    }
}
