//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, catalog, genres, health, instances, languages, profiles};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LocalLibrary API",
        version = "0.1.0",
        description = "Small library catalog with loans and member profiles",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Accounts
        auth::signup,
        auth::login,
        auth::me,
        auth::set_user_groups,
        // Catalog
        catalog::summary,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Copies and loans
        instances::list_book_instances,
        instances::create_instance,
        instances::get_instance,
        instances::update_instance,
        instances::delete_instance,
        instances::renewal_form,
        instances::renew_instance,
        instances::mark_returned,
        instances::my_books,
        instances::all_borrowed,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Genres
        genres::list_genres,
        genres::get_genre,
        genres::create_genre,
        genres::update_genre,
        genres::delete_genre,
        // Languages
        languages::list_languages,
        languages::get_language,
        languages::create_language,
        languages::update_language,
        languages::delete_language,
        // Profiles
        profiles::create_profile,
        profiles::get_profile,
        profiles::update_profile,
        profiles::delete_profile,
    ),
    components(
        schemas(
            // Accounts
            auth::LoginRequest,
            auth::LoginResponse,
            crate::models::user::User,
            crate::models::user::UserInfo,
            crate::models::user::CreateUser,
            crate::models::user::UpdateGroups,
            crate::models::user::Permission,
            // Catalog
            crate::models::summary::CatalogSummary,
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::BookDetails,
            crate::models::book::BookInput,
            crate::models::author::Author,
            crate::models::author::AuthorShort,
            crate::models::author::AuthorDetails,
            crate::models::author::AuthorInput,
            crate::models::genre::Genre,
            crate::models::genre::GenreInput,
            crate::models::language::Language,
            crate::models::language::LanguageInput,
            crate::api::BookPage,
            crate::api::AuthorPage,
            // Copies and loans
            crate::models::book_instance::LoanStatus,
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::BookInstanceDetails,
            crate::models::book_instance::BookInstanceInput,
            crate::models::book_instance::RenewBookRequest,
            crate::models::book_instance::RenewBookForm,
            // Profiles
            crate::models::profile::UserProfile,
            crate::models::profile::ProfileDetails,
            crate::models::profile::ProfileInput,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "accounts", description = "Sign-up and authentication"),
        (name = "catalog", description = "Catalog home"),
        (name = "books", description = "Book management"),
        (name = "instances", description = "Book copies and loans"),
        (name = "authors", description = "Author management"),
        (name = "genres", description = "Genre management"),
        (name = "languages", description = "Language management"),
        (name = "profiles", description = "Member profiles")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_loan_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/catalog/instances/{id}/renew"));
        assert!(doc.paths.paths.contains_key("/catalog/mybooks"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
