//! HTTP handlers for user management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{Action, Resource, Role};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::user::{NewUser, UpdateUserInput, User, VendorSummary};
use crate::services::UserService;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub role: Role,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// List all users
pub async fn list_users(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<User>>> {
    current_user.0.require(Resource::User, Action::View)?;

    let service = UserService::new(state.db);
    let users = service.list_users().await?;
    Ok(Json(users))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<User>> {
    current_user.0.require(Resource::User, Action::View)?;

    let service = UserService::new(state.db);
    let user = service.get_user(user_id).await?;
    Ok(Json(user))
}

/// Create a user
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    current_user.0.require(Resource::User, Action::Create)?;
    body.validate()?;

    let service = UserService::new(state.db);
    let user = service
        .create_user(
            Some(current_user.0.user_id),
            NewUser {
                username: body.username,
                password: body.password,
                email: body.email,
                phone: body.phone,
                first_name: body.first_name,
                last_name: body.last_name,
                role: body.role,
                is_active: body.is_active,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user
pub async fn update_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> AppResult<Json<User>> {
    current_user.0.require(Resource::User, Action::Edit)?;
    body.validate()?;

    let service = UserService::new(state.db);
    let user = service
        .update_user(
            current_user.0.user_id,
            user_id,
            UpdateUserInput {
                email: body.email,
                phone: body.phone,
                first_name: body.first_name,
                last_name: body.last_name,
                role: body.role,
                is_active: body.is_active,
            },
        )
        .await?;
    Ok(Json(user))
}

/// Deactivate a user
pub async fn deactivate_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<User>> {
    current_user.0.require(Resource::User, Action::Edit)?;

    let service = UserService::new(state.db);
    let user = service
        .deactivate_user(current_user.0.user_id, user_id)
        .await?;
    Ok(Json(user))
}

/// List vendors available for item assignment
pub async fn list_vendors(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<VendorSummary>>> {
    current_user.0.require(Resource::Item, Action::Create)?;

    let service = UserService::new(state.db);
    let vendors = service.list_vendors().await?;
    Ok(Json(vendors))
}
