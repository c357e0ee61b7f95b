//! Authentication service for login, registration and token management

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::Role;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::user::{NewUser, User, UserService};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub username: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub role: Role,
}

/// Input for self-service customer registration
#[derive(Debug, Deserialize)]
pub struct RegisterCustomerInput {
    pub username: String,
    pub password: String,
    pub email: String,
    pub phone: Option<String>,
    pub first_name: String,
    pub last_name: String,
}

/// User info needed to authenticate
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    id: i64,
    username: String,
    password_hash: String,
    is_active: bool,
    #[sqlx(try_from = "String")]
    role: Role,
}

/// Hash a plain text password
pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a plain text password against a stored hash
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    verify(password, password_hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

/// Whether a stored value parses as a bcrypt hash
pub fn is_valid_bcrypt_hash(password_hash: &str) -> bool {
    verify("candidate", password_hash).is_ok()
}

/// Sign an access token for a user
pub fn issue_access_token(
    user_id: i64,
    username: &str,
    role: Role,
    secret: &str,
    expiry_seconds: i64,
) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role: role.as_str().to_string(),
        permissions: role.permission_strings(),
        exp: (now + Duration::seconds(expiry_seconds)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Decode and validate an access token
pub fn decode_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

/// Hash a refresh token for storage
pub fn hash_token(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Authenticate user with username and password
    pub async fn login(&self, username: &str, password: &str) -> AppResult<AuthTokens> {
        let user = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT u.id, u.username, u.password_hash, u.is_active, r.role_name AS role
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        // A corrupt stored hash is reported like a wrong password
        if !verify_password(password, &user.password_hash).unwrap_or(false) {
            tracing::info!(username = %username, "Rejected login attempt");
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        let tokens = self.generate_tokens(user.id, &user.username, user.role)?;
        self.store_refresh_token(user.id, &tokens.refresh_token).await?;

        tracing::info!(user_id = user.id, role = %user.role, "User logged in");

        Ok(tokens)
    }

    /// Register a customer account
    pub async fn register_customer(&self, input: RegisterCustomerInput) -> AppResult<User> {
        let user_service = UserService::new(self.db.clone());
        let user = user_service
            .create_user(
                None,
                NewUser {
                    username: input.username,
                    password: input.password,
                    email: input.email,
                    phone: input.phone,
                    first_name: input.first_name,
                    last_name: input.last_name,
                    role: Role::Customer,
                    is_active: true,
                },
            )
            .await?;

        tracing::info!(user_id = user.id, "Customer registered");

        Ok(user)
    }

    /// Refresh access token using refresh token
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let invalid = || AppError::Unauthorized("Invalid or expired refresh token".to_string());
        let mut tx = self.db.begin().await?;

        // Revoking first means a token can be spent only once
        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE refresh_tokens SET revoked_at = NOW()
            WHERE token_hash = $1 AND revoked_at IS NULL AND expires_at > NOW()
            RETURNING user_id
            "#,
        )
        .bind(hash_token(refresh_token))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(invalid)?;

        let user = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT u.id, u.username, u.password_hash, u.is_active, r.role_name AS role
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.id = $1 AND u.is_active = true
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(invalid)?;

        let tokens = self.generate_tokens(user.id, &user.username, user.role)?;

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user.id)
        .bind(hash_token(&tokens.refresh_token))
        .bind(self.refresh_expires_at())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(user_id = user.id, "Refresh token rotated");

        Ok(tokens)
    }

    /// Revoke a refresh token (logout)
    pub async fn revoke_refresh_token(&self, refresh_token: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(hash_token(refresh_token))
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Reset every stored hash that bcrypt cannot parse to the hash of `default_password`
    pub async fn rehash_invalid_passwords(&self, default_password: &str) -> AppResult<u64> {
        let users = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, username, password_hash FROM users ORDER BY id",
        )
        .fetch_all(&self.db)
        .await?;

        let mut rehashed = 0;
        for (user_id, username, password_hash) in users {
            if is_valid_bcrypt_hash(&password_hash) {
                continue;
            }

            tracing::warn!(user_id, username = %username, "Rehashing invalid password hash");
            sqlx::query("UPDATE users SET password_hash = $1, updated_on = NOW() WHERE id = $2")
                .bind(hash_password(default_password)?)
                .bind(user_id)
                .execute(&self.db)
                .await?;
            rehashed += 1;
        }

        Ok(rehashed)
    }

    /// Create the configured superadmin when no superadmin exists yet
    pub async fn ensure_superadmin(&self, config: &Config) -> AppResult<Option<i64>> {
        let (Some(username), Some(password)) = (
            config.bootstrap.superadmin_username.as_deref(),
            config.bootstrap.superadmin_password.as_deref(),
        ) else {
            return Ok(None);
        };

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role_id = $1")
            .bind(Role::Superadmin.id())
            .fetch_one(&self.db)
            .await?;

        if existing > 0 {
            return Ok(None);
        }

        let user_service = UserService::new(self.db.clone());
        let user = user_service
            .create_user(
                None,
                NewUser {
                    username: username.to_string(),
                    password: password.to_string(),
                    email: config
                        .bootstrap
                        .superadmin_email
                        .clone()
                        .unwrap_or_else(|| format!("{}@localhost.localdomain", username)),
                    phone: None,
                    first_name: "System".to_string(),
                    last_name: "Administrator".to_string(),
                    role: Role::Superadmin,
                    is_active: true,
                },
            )
            .await?;

        tracing::info!(user_id = user.id, "Bootstrapped superadmin account");

        Ok(Some(user.id))
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user_id: i64, username: &str, role: Role) -> AppResult<AuthTokens> {
        let access_token = issue_access_token(
            user_id,
            username,
            role,
            &self.jwt_secret,
            self.access_token_expiry,
        )?;

        // Refresh token (simple random token)
        let refresh_token = Uuid::new_v4().to_string();

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
            role,
        })
    }

    fn refresh_expires_at(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.refresh_token_expiry)
    }

    /// Store refresh token in database
    async fn store_refresh_token(&self, user_id: i64, token: &str) -> AppResult<()> {
        let expires_at = self.refresh_expires_at();

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(hash_token(token))
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_password_hash_round_trip() {
        let hashed = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hashed).unwrap());
        assert!(!verify_password("wrong horse", &hashed).unwrap());
        assert!(is_valid_bcrypt_hash(&hashed));
    }

    #[test]
    fn test_plaintext_is_not_a_bcrypt_hash() {
        assert!(!is_valid_bcrypt_hash("password123"));
        assert!(!is_valid_bcrypt_hash(""));
    }

    #[test]
    fn test_access_token_carries_role_permissions() {
        let token = issue_access_token(7, "vendor1", Role::Vendor, SECRET, 60).unwrap();
        let claims = decode_access_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "vendor1");
        assert_eq!(claims.role, "vendor");
        assert!(claims.permissions.contains(&"item:create".to_string()));
        assert!(!claims.permissions.contains(&"cart:edit".to_string()));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_access_token(7, "vendor1", Role::Vendor, SECRET, 60).unwrap();
        assert!(matches!(
            decode_access_token(&token, "other-secret"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_is_reported() {
        // Past the default 60 second leeway
        let token = issue_access_token(7, "vendor1", Role::Vendor, SECRET, -120).unwrap();
        assert!(matches!(
            decode_access_token(&token, SECRET),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_token_hash_is_stable_and_opaque() {
        let token = "b1e0b1a4-1f7d-4b35-8f0b-7b0f7e3b2d11";
        assert_eq!(hash_token(token), hash_token(token));
        assert_ne!(hash_token(token), token);
        assert_ne!(hash_token(token), hash_token("other"));
        // SHA-256 is 32 bytes, 43 characters unpadded
        assert_eq!(hash_token(token).len(), 43);
    }
}
