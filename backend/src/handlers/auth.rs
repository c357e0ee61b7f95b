//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::services::auth::{AuthTokens, RegisterCustomerInput};
use crate::services::user::User;
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
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
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthTokens>, AppError> {
    body.validate()?;

    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.login(&body.username, &body.password).await?;

    Ok(Json(tokens))
}

/// Customer self-registration endpoint handler
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    body.validate()?;

    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user = auth_service
        .register_customer(RegisterCustomerInput {
            username: body.username,
            password: body.password,
            email: body.email,
            phone: body.phone,
            first_name: body.first_name,
            last_name: body.last_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<AuthTokens>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.refresh_token(&body.refresh_token).await?;

    Ok(Json(tokens))
}

/// Logout endpoint handler; revokes the presented refresh token
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<LogoutResponse>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    auth_service.revoke_refresh_token(&body.refresh_token).await?;

    Ok(Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}
