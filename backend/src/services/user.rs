//! User management service for administrators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    validate_email, validate_name, validate_password, validate_phone, validate_username, Role,
};
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};
use crate::services::auth::hash_password;

/// User service
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// A user account
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_active: bool,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Vendor entry for item assignment
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VendorSummary {
    pub id: i64,
    pub vendor_name: String,
}

/// Input for creating a user
#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub phone: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
}

/// Input for updating a user
#[derive(Debug, Deserialize, Default)]
pub struct UpdateUserInput {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

pub(crate) const USER_COLUMNS: &str = r#"
    u.id, u.username, u.email, u.phone, u.first_name, u.last_name, r.role_name AS role,
    u.is_active, u.created_by, u.updated_by, u.created_on, u.updated_on, u.last_login_at
"#;

/// Run a shared validator and attach the field name
pub(crate) fn check(field: &str, result: Result<(), &'static str>) -> AppResult<()> {
    result.map_err(|message| AppError::validation(field, message))
}

/// New phone value for an update: absent keeps the stored one, blank clears it
pub(crate) fn merge_phone(input: Option<String>, existing: Option<String>) -> Option<String> {
    match input {
        Some(phone) if phone.trim().is_empty() => None,
        Some(phone) => Some(phone),
        None => existing,
    }
}

/// Run the contact and name validators shared by every account update
pub(crate) fn check_contact(
    email: &str,
    phone: Option<&str>,
    first_name: &str,
    last_name: &str,
) -> AppResult<()> {
    check("email", validate_email(email))?;
    if let Some(phone) = phone.filter(|p| !p.is_empty()) {
        check("phone", validate_phone(phone))?;
    }
    check("first_name", validate_name(first_name))?;
    check("last_name", validate_name(last_name))
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List every user
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users u JOIN roles r ON r.id = u.role_id ORDER BY u.id",
            USER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Create a user; `actor_id` is `None` for self-registration and bootstrap
    pub async fn create_user(&self, actor_id: Option<i64>, input: NewUser) -> AppResult<User> {
        check("username", validate_username(&input.username))?;
        check("password", validate_password(&input.password))?;
        let phone = merge_phone(input.phone, None);
        check_contact(&input.email, phone.as_deref(), &input.first_name, &input.last_name)?;

        let password_hash = hash_password(&input.password)?;

        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, password_hash, email, phone, first_name, last_name,
                               role_id, is_active, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING id
            "#,
        )
        .bind(&input.username)
        .bind(&password_hash)
        .bind(&input.email)
        .bind(&phone)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.role.id())
        .bind(input.is_active)
        .bind(actor_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "username"))?;

        tracing::info!(user_id, role = %input.role, created_by = ?actor_id, "User created");

        self.get_user(user_id).await
    }

    /// Update a user's contact details, role and active flag
    pub async fn update_user(
        &self,
        actor_id: i64,
        user_id: i64,
        input: UpdateUserInput,
    ) -> AppResult<User> {
        let existing = self.get_user(user_id).await?;

        let email = input.email.unwrap_or(existing.email);
        let phone = merge_phone(input.phone, existing.phone);
        let first_name = input.first_name.unwrap_or(existing.first_name);
        let last_name = input.last_name.unwrap_or(existing.last_name);
        let role = input.role.unwrap_or(existing.role);
        let is_active = input.is_active.unwrap_or(existing.is_active);

        check_contact(&email, phone.as_deref(), &first_name, &last_name)?;

        sqlx::query(
            r#"
            UPDATE users
            SET email = $1, phone = $2, first_name = $3, last_name = $4, role_id = $5,
                is_active = $6, updated_by = $7, updated_on = NOW()
            WHERE id = $8
            "#,
        )
        .bind(&email)
        .bind(&phone)
        .bind(&first_name)
        .bind(&last_name)
        .bind(role.id())
        .bind(is_active)
        .bind(actor_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if existing.is_active && !is_active {
            self.revoke_sessions(user_id).await?;
        }

        tracing::info!(user_id, updated_by = actor_id, "User updated");

        self.get_user(user_id).await
    }

    /// Deactivate a user; accounts are never deleted
    pub async fn deactivate_user(&self, actor_id: i64, user_id: i64) -> AppResult<User> {
        if actor_id == user_id {
            return Err(AppError::validation("id", "You cannot deactivate your own account"));
        }

        let result = sqlx::query(
            "UPDATE users SET is_active = false, updated_by = $1, updated_on = NOW() WHERE id = $2",
        )
        .bind(actor_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User".to_string()));
        }

        self.revoke_sessions(user_id).await?;

        tracing::info!(user_id, updated_by = actor_id, "User deactivated");

        self.get_user(user_id).await
    }

    /// Outstanding sessions of a deactivated user stop refreshing
    pub(crate) async fn revoke_sessions(&self, user_id: i64) -> AppResult<()> {
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// List users holding the vendor role
    pub async fn list_vendors(&self) -> AppResult<Vec<VendorSummary>> {
        let vendors = sqlx::query_as::<_, VendorSummary>(
            r#"
            SELECT id, CONCAT(first_name, ' ', last_name) AS vendor_name
            FROM users
            WHERE role_id = $1 AND is_active = true
            ORDER BY vendor_name
            "#,
        )
        .bind(Role::Vendor.id())
        .fetch_all(&self.db)
        .await?;

        Ok(vendors)
    }

    /// Role of a user, used to verify vendor assignment
    pub async fn get_role(&self, user_id: i64) -> AppResult<Role> {
        let role_id = sqlx::query_scalar::<_, i32>("SELECT role_id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;

        Ok(Role::from_id(role_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_phone_clears_stored_value() {
        let stored = Some("555-0100".to_string());
        assert_eq!(merge_phone(None, stored.clone()), stored);
        assert_eq!(merge_phone(Some(String::new()), stored.clone()), None);
        assert_eq!(merge_phone(Some("  ".to_string()), stored.clone()), None);
        assert_eq!(
            merge_phone(Some("5550199".to_string()), stored),
            Some("5550199".to_string())
        );
    }

    #[test]
    fn test_contact_fields_respect_column_limits() {
        assert!(check_contact("a@b.co", Some("5551234567"), "Ada", "Lovelace").is_ok());
        assert!(check_contact("a@b.co", None, "Ada", "Lovelace").is_ok());

        let field_of = |result: AppResult<()>| match result {
            Err(AppError::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {:?}", other),
        };
        assert_eq!(
            field_of(check_contact("a@b.co", Some("1-2-3-4-5-6-7-8-9-0-1-2"), "Ada", "L")),
            "phone"
        );
        assert_eq!(
            field_of(check_contact("a@b.co", None, &"x".repeat(101), "L")),
            "first_name"
        );
        assert_eq!(
            field_of(check_contact("a@b.co", None, "Ada", &"y".repeat(101))),
            "last_name"
        );
        let long_email = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            field_of(check_contact(&long_email, None, "Ada", "L")),
            "email"
        );
    }
}
