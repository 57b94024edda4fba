//! Account endpoints: sign-up, login and current user

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::{CreateUser, UpdateGroups, UserInfo},
};

use super::AuthenticatedUser;

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token
    pub token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
    pub user: UserInfo,
}

/// Create an account
#[utoipa::path(
    post,
    path = "/accounts/signup",
    tag = "accounts",
    request_body = CreateUser,
    responses(
        (status = 201, description = "Account created", body = UserInfo),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn signup(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    let user = state.services.auth.signup(request).await?;
    let info = state.services.auth.user_info(user.id).await?;
    Ok((StatusCode::CREATED, Json(info)))
}

/// Log in and obtain a bearer token
#[utoipa::path(
    post,
    path = "/accounts/login",
    tag = "accounts",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state
        .services
        .auth
        .login(&request.username, &request.password)
        .await?;
    let info = state.services.auth.user_info(user.id).await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.auth.jwt_expiration_hours * 3600,
        user: info,
    }))
}

/// Current user, groups and permissions
#[utoipa::path(
    get,
    path = "/accounts/me",
    tag = "accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserInfo>> {
    let info = state.services.auth.user_info(claims.user_id).await?;
    Ok(Json(info))
}

/// Replace the groups of a user
#[utoipa::path(
    put,
    path = "/accounts/users/{id}/groups",
    tag = "accounts",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateGroups,
    responses(
        (status = 200, description = "Groups updated", body = UserInfo),
        (status = 400, description = "Unknown group"),
        (status = 403, description = "Superuser privileges required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_user_groups(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateGroups>,
) -> AppResult<Json<UserInfo>> {
    let info = state.services.auth.set_groups(&claims, id, data).await?;
    Ok(Json(info))
}
