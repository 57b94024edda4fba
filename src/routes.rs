//! HTTP routes

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{api, AppState};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(api::catalog::root_redirect))
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Accounts
        .route("/accounts/signup", post(api::auth::signup))
        .route("/accounts/login", post(api::auth::login))
        .route("/accounts/me", get(api::auth::me))
        .route("/accounts/users/:id/groups", put(api::auth::set_user_groups))
        // Catalog home
        .route("/catalog", get(api::catalog::summary))
        .route("/catalog/", get(api::catalog::summary))
        // Books
        .route("/catalog/books", get(api::books::list_books))
        .route("/catalog/books", post(api::books::create_book))
        .route("/catalog/books/:slug", get(api::books::get_book))
        .route("/catalog/books/:slug", put(api::books::update_book))
        .route("/catalog/books/:slug", delete(api::books::delete_book))
        .route("/catalog/books/:slug/instances", get(api::instances::list_book_instances))
        .route("/catalog/books/:slug/instances", post(api::instances::create_instance))
        // Copies and loans
        .route("/catalog/instances/:id", get(api::instances::get_instance))
        .route("/catalog/instances/:id", put(api::instances::update_instance))
        .route("/catalog/instances/:id", delete(api::instances::delete_instance))
        .route("/catalog/instances/:id/renew", get(api::instances::renewal_form))
        .route("/catalog/instances/:id/renew", post(api::instances::renew_instance))
        .route("/catalog/instances/:id/return", post(api::instances::mark_returned))
        .route("/catalog/mybooks", get(api::instances::my_books))
        .route("/catalog/borrowed", get(api::instances::all_borrowed))
        // Authors
        .route("/catalog/authors", get(api::authors::list_authors))
        .route("/catalog/authors", post(api::authors::create_author))
        .route("/catalog/authors/:id", get(api::authors::get_author))
        .route("/catalog/authors/:id", put(api::authors::update_author))
        .route("/catalog/authors/:id", delete(api::authors::delete_author))
        // Genres
        .route("/catalog/genres", get(api::genres::list_genres))
        .route("/catalog/genres", post(api::genres::create_genre))
        .route("/catalog/genres/:id", get(api::genres::get_genre))
        .route("/catalog/genres/:id", put(api::genres::update_genre))
        .route("/catalog/genres/:id", delete(api::genres::delete_genre))
        // Languages
        .route("/catalog/languages", get(api::languages::list_languages))
        .route("/catalog/languages", post(api::languages::create_language))
        .route("/catalog/languages/:id", get(api::languages::get_language))
        .route("/catalog/languages/:id", put(api::languages::update_language))
        .route("/catalog/languages/:id", delete(api::languages::delete_language))
        // Profiles
        .route("/catalog/profiles", post(api::profiles::create_profile))
        .route("/catalog/profiles/:slug", get(api::profiles::get_profile))
        .route("/catalog/profiles/:slug", put(api::profiles::update_profile))
        .route("/catalog/profiles/:slug", delete(api::profiles::delete_profile))
        .with_state(state);

    Router::new()
        .merge(app)
        .merge(api::openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
