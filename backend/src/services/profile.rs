//! Self-service profile management

use serde::Deserialize;
use shared::validate_username;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::services::user::{check, check_contact, merge_phone, User, UserService};

/// Profile service
#[derive(Clone)]
pub struct ProfileService {
    db: PgPool,
}

/// Fields a user may change on their own account
#[derive(Debug, Deserialize, Default)]
pub struct UpdateProfileInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

impl ProfileService {
    /// Create a new ProfileService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_profile(&self, user_id: i64) -> AppResult<User> {
        UserService::new(self.db.clone()).get_user(user_id).await
    }

    /// Update the caller's own account
    pub async fn update_profile(&self, user_id: i64, input: UpdateProfileInput) -> AppResult<User> {
        let existing = self.get_profile(user_id).await?;

        let username = input.username.unwrap_or(existing.username);
        let email = input.email.unwrap_or(existing.email);
        let phone = merge_phone(input.phone, existing.phone);
        let first_name = input.first_name.unwrap_or(existing.first_name);
        let last_name = input.last_name.unwrap_or(existing.last_name);
        let existing_active = existing.is_active;
        let is_active = input.is_active.unwrap_or(existing_active);

        check("username", validate_username(&username))?;
        check_contact(&email, phone.as_deref(), &first_name, &last_name)?;

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 AND id <> $2)",
        )
        .bind(&username)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::DuplicateEntry("username".to_string()));
        }

        sqlx::query(
            r#"
            UPDATE users
            SET username = $1, email = $2, phone = $3, first_name = $4, last_name = $5,
                is_active = $6, updated_by = $7, updated_on = NOW()
            WHERE id = $7
            "#,
        )
        .bind(&username)
        .bind(&email)
        .bind(&phone)
        .bind(&first_name)
        .bind(&last_name)
        .bind(is_active)
        .bind(user_id)
        .execute(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "username"))?;

        if existing_active && !is_active {
            UserService::new(self.db.clone()).revoke_sessions(user_id).await?;
        }

        tracing::info!(user_id, "Profile updated");

        self.get_profile(user_id).await
    }
}
