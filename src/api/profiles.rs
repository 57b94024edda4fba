//! User profile endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::profile::{ProfileDetails, ProfileInput},
};

use super::AuthenticatedUser;

/// Profile page by slug
#[utoipa::path(
    get,
    path = "/catalog/profiles/{slug}",
    tag = "profiles",
    params(("slug" = String, Path, description = "Profile slug")),
    responses(
        (status = 200, description = "Profile", body = ProfileDetails),
        (status = 404, description = "Profile not found")
    )
)]
pub async fn get_profile(
    State(state): State<crate::AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ProfileDetails>> {
    let profile = state.services.profiles.get_profile(&slug).await?;
    Ok(Json(profile))
}

/// Create the current user's profile
#[utoipa::path(
    post,
    path = "/catalog/profiles",
    tag = "profiles",
    security(("bearer_auth" = [])),
    request_body = ProfileInput,
    responses(
        (status = 201, description = "Profile created, user joined Library Member", body = ProfileDetails),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "User already has a profile")
    )
)]
pub async fn create_profile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<ProfileInput>,
) -> AppResult<(StatusCode, Json<ProfileDetails>)> {
    let profile = state.services.profiles.create_profile(claims.user_id, data).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Update own profile
#[utoipa::path(
    put,
    path = "/catalog/profiles/{slug}",
    tag = "profiles",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Profile slug")),
    request_body = ProfileInput,
    responses(
        (status = 200, description = "Profile updated", body = ProfileDetails),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Profile not found")
    )
)]
pub async fn update_profile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(slug): Path<String>,
    Json(data): Json<ProfileInput>,
) -> AppResult<Json<ProfileDetails>> {
    let profile = state.services.profiles.update_profile(&claims, &slug, data).await?;
    Ok(Json(profile))
}

/// Delete a profile, releasing the owner's borrowed copies
#[utoipa::path(
    delete,
    path = "/catalog/profiles/{slug}",
    tag = "profiles",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Profile slug")),
    responses(
        (status = 204, description = "Profile deleted"),
        (status = 403, description = "Neither owner nor librarian"),
        (status = 404, description = "Profile not found")
    )
)]
pub async fn delete_profile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    state.services.profiles.delete_profile(&claims, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
