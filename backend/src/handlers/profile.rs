//! Profile handlers

use axum::{extract::State, Json};
use serde::Deserialize;
use shared::{Action, Resource};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::profile::UpdateProfileInput;
use crate::services::user::User;
use crate::services::ProfileService;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

/// The caller's own account
pub async fn get_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<User>> {
    current_user.0.require(Resource::Profile, Action::View)?;

    let service = ProfileService::new(state.db);
    let user = service.get_profile(current_user.0.user_id).await?;
    Ok(Json(user))
}

/// Update the caller's own account
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<User>> {
    current_user.0.require(Resource::Profile, Action::Edit)?;
    body.validate()?;

    let service = ProfileService::new(state.db);
    let user = service
        .update_profile(
            current_user.0.user_id,
            UpdateProfileInput {
                username: body.username,
                email: body.email,
                phone: body.phone,
                first_name: body.first_name,
                last_name: body.last_name,
                is_active: body.is_active,
            },
        )
        .await?;
    Ok(Json(user))
}
