//! Book endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::book::{BookDetails, BookInput, BookQuery, BookShort},
};

use super::{AuthenticatedUser, BookPage, PaginatedResponse};

/// List books with title search and pagination
#[utoipa::path(
    get,
    path = "/catalog/books",
    tag = "books",
    params(
        ("title" = Option<String>, Query, description = "Search in title"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Books per page")
    ),
    responses(
        (status = 200, description = "List of books", body = BookPage)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<BookShort>>> {
    let (books, total, page) = state.services.catalog.search_books(&query).await?;

    Ok(Json(PaginatedResponse {
        items: books,
        total,
        page: page.page,
        per_page: page.per_page,
    }))
}

/// Book details by slug
#[utoipa::path(
    get,
    path = "/catalog/books/{slug}",
    tag = "books",
    params(("slug" = String, Path, description = "Book slug")),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.catalog.get_book(&slug).await?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/catalog/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = BookDetails),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing can_crud_books"),
        (status = 409, description = "ISBN or slug already used")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<BookInput>,
) -> AppResult<(StatusCode, Json<BookDetails>)> {
    claims.require_crud_books()?;
    let book = state.services.catalog.create_book(data).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/catalog/books/{slug}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Book slug")),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = BookDetails),
        (status = 404, description = "Book not found"),
        (status = 409, description = "ISBN or slug already used")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(slug): Path<String>,
    Json(data): Json<BookInput>,
) -> AppResult<Json<BookDetails>> {
    claims.require_crud_books()?;
    let book = state.services.catalog.update_book(&slug, data).await?;
    Ok(Json(book))
}

/// Delete a book without copies
#[utoipa::path(
    delete,
    path = "/catalog/books/{slug}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Book slug")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book still has copies")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    claims.require_crud_books()?;
    state.services.catalog.delete_book(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
