//! Book copy and loan endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book_instance::{BookInstanceDetails, BookInstanceInput, RenewBookForm, RenewBookRequest},
};

use super::AuthenticatedUser;

/// Copies of a book
#[utoipa::path(
    get,
    path = "/catalog/books/{slug}/instances",
    tag = "instances",
    params(("slug" = String, Path, description = "Book slug")),
    responses(
        (status = 200, description = "Copies of the book", body = Vec<BookInstanceDetails>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn list_book_instances(
    State(state): State<crate::AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Vec<BookInstanceDetails>>> {
    let instances = state.services.loans.list_for_book(&slug).await?;
    Ok(Json(instances))
}

/// Add a copy of a book
#[utoipa::path(
    post,
    path = "/catalog/books/{slug}/instances",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Book slug")),
    request_body = BookInstanceInput,
    responses(
        (status = 201, description = "Copy created", body = BookInstanceDetails),
        (status = 403, description = "Missing can_crud_books"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(slug): Path<String>,
    Json(data): Json<BookInstanceInput>,
) -> AppResult<(StatusCode, Json<BookInstanceDetails>)> {
    claims.require_crud_books()?;
    let instance = state.services.loans.create_instance(&slug, data).await?;
    Ok((StatusCode::CREATED, Json(instance)))
}

/// Get a copy
#[utoipa::path(
    get,
    path = "/catalog/instances/{id}",
    tag = "instances",
    params(("id" = Uuid, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Copy", body = BookInstanceDetails),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn get_instance(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstanceDetails>> {
    let instance = state.services.loans.get_instance(id).await?;
    Ok(Json(instance))
}

/// Update a copy
#[utoipa::path(
    put,
    path = "/catalog/instances/{id}",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Copy ID")),
    request_body = BookInstanceInput,
    responses(
        (status = 200, description = "Copy updated", body = BookInstanceDetails),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn update_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<BookInstanceInput>,
) -> AppResult<Json<BookInstanceDetails>> {
    claims.require_crud_books()?;
    let instance = state.services.loans.update_instance(id, data).await?;
    Ok(Json(instance))
}

/// Delete a copy
#[utoipa::path(
    delete,
    path = "/catalog/instances/{id}",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Copy ID")),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn delete_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    claims.require_crud_books()?;
    state.services.loans.delete_instance(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Renewal form defaults: proposed date and borrower choices
#[utoipa::path(
    get,
    path = "/catalog/instances/{id}/renew",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Renewal form", body = RenewBookForm),
        (status = 403, description = "Missing can_mark_returned")
    )
)]
pub async fn renewal_form(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewBookForm>> {
    claims.require_mark_returned()?;
    let form = state.services.loans.renewal_form(id).await?;
    Ok(Json(form))
}

/// Renew or lend a copy (date within the next 4 weeks)
#[utoipa::path(
    post,
    path = "/catalog/instances/{id}/renew",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Copy ID")),
    request_body = RenewBookRequest,
    responses(
        (status = 200, description = "Copy on loan until the renewal date", body = BookInstanceDetails),
        (status = 400, description = "Renewal date in the past or more than 4 weeks ahead, or unknown borrower"),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renew_instance(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RenewBookRequest>,
) -> AppResult<Json<BookInstanceDetails>> {
    claims.require_mark_returned()?;
    let instance = state.services.loans.renew(id, request).await?;
    Ok(Json(instance))
}

/// Mark a copy as returned
#[utoipa::path(
    post,
    path = "/catalog/instances/{id}/return",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Copy available again", body = BookInstanceDetails),
        (status = 403, description = "Missing can_mark_returned"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn mark_returned(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BookInstanceDetails>> {
    claims.require_mark_returned()?;
    let instance = state.services.loans.mark_returned(id).await?;
    Ok(Json(instance))
}

/// Copies on loan to the current user
#[utoipa::path(
    get,
    path = "/catalog/mybooks",
    tag = "instances",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Borrowed copies, soonest due first", body = Vec<BookInstanceDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookInstanceDetails>>> {
    let instances = state.services.loans.borrowed_by(claims.user_id).await?;
    Ok(Json(instances))
}

/// Every copy on loan
#[utoipa::path(
    get,
    path = "/catalog/borrowed",
    tag = "instances",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All borrowed copies", body = Vec<BookInstanceDetails>),
        (status = 403, description = "Missing can_mark_returned")
    )
)]
pub async fn all_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookInstanceDetails>>> {
    claims.require_mark_returned()?;
    let instances = state.services.loans.all_borrowed().await?;
    Ok(Json(instances))
}
