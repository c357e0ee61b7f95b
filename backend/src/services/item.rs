//! Inventory item service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{validate_price, validate_stock, ItemScope, Role};
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::user::{check, UserService};

/// Item service
#[derive(Clone)]
pub struct ItemService {
    db: PgPool,
}

/// Item with its vendor's name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Item {
    pub id: i64,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub vendor_id: i64,
    pub vendor_name: String,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

/// Catalog entry offered to customers
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CatalogEntry {
    pub id: i64,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub vendor_name: String,
}

/// Input for creating an item
#[derive(Debug, Deserialize)]
pub struct CreateItemInput {
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    /// Required when a superadmin creates the item
    pub vendor_id: Option<i64>,
}

const ITEM_SELECT: &str = r#"
    SELECT i.id, i.description, i.price, i.stock, i.vendor_id,
           CONCAT(v.first_name, ' ', v.last_name) AS vendor_name,
           i.created_by, i.updated_by, i.created_on, i.updated_on
    FROM items i
    JOIN users v ON v.id = i.vendor_id
"#;

/// Resolve the owning vendor for a new item
pub(crate) fn resolve_vendor(actor: &AuthUser, requested: Option<i64>) -> AppResult<i64> {
    match actor.role {
        Role::Vendor | Role::VendorAdmin => Ok(actor.user_id),
        Role::Superadmin => {
            requested.ok_or_else(|| AppError::validation("vendor_id", "A vendor must be selected"))
        }
        Role::CustomerAdmin | Role::Customer => Err(AppError::InsufficientPermissions),
    }
}

impl ItemService {
    /// Create a new ItemService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List the items visible in the given scope
    pub async fn list_items(&self, scope: ItemScope) -> AppResult<Vec<Item>> {
        let items = match scope {
            ItemScope::All => {
                sqlx::query_as::<_, Item>(&format!("{} ORDER BY i.id", ITEM_SELECT))
                    .fetch_all(&self.db)
                    .await?
            }
            ItemScope::Vendor(vendor_id) => {
                sqlx::query_as::<_, Item>(&format!(
                    "{} WHERE i.vendor_id = $1 ORDER BY i.id",
                    ITEM_SELECT
                ))
                .bind(vendor_id)
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(items)
    }

    /// Get an item by ID within the given scope
    pub async fn get_item(&self, scope: ItemScope, item_id: i64) -> AppResult<Item> {
        let item = sqlx::query_as::<_, Item>(&format!("{} WHERE i.id = $1", ITEM_SELECT))
            .bind(item_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        match scope {
            ItemScope::Vendor(vendor_id) if item.vendor_id != vendor_id => {
                Err(AppError::NotFound("Item".to_string()))
            }
            _ => Ok(item),
        }
    }

    /// Create an item
    pub async fn create_item(&self, actor: &AuthUser, input: CreateItemInput) -> AppResult<Item> {
        if input.description.trim().is_empty() {
            return Err(AppError::validation("description", "Description is required"));
        }
        check("price", validate_price(input.price))?;
        check("stock", validate_stock(input.stock))?;

        let vendor_id = resolve_vendor(actor, input.vendor_id)?;
        if actor.role == Role::Superadmin {
            let role = UserService::new(self.db.clone())
                .get_role(vendor_id)
                .await
                .map_err(|_| AppError::validation("vendor_id", "Vendor does not exist"))?;
            if role != Role::Vendor {
                return Err(AppError::validation("vendor_id", "Selected user is not a vendor"));
            }
        }

        let item_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO items (description, price, stock, vendor_id, created_by, updated_by)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id
            "#,
        )
        .bind(input.description.trim())
        .bind(input.price)
        .bind(input.stock)
        .bind(vendor_id)
        .bind(actor.user_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(item_id, vendor_id, created_by = actor.user_id, "Item created");

        self.get_item(ItemScope::All, item_id).await
    }

    /// Set the stock level of an item
    pub async fn update_stock(&self, actor: &AuthUser, item_id: i64, stock: i32) -> AppResult<Item> {
        check("stock", validate_stock(stock))?;

        // Vendors only see, and so only update, their own items
        let item = self.get_item(actor.item_scope(), item_id).await?;

        sqlx::query(
            "UPDATE items SET stock = $1, updated_by = $2, updated_on = NOW() WHERE id = $3",
        )
        .bind(stock)
        .bind(actor.user_id)
        .bind(item.id)
        .execute(&self.db)
        .await?;

        tracing::info!(
            item_id,
            old_stock = item.stock,
            new_stock = stock,
            updated_by = actor.user_id,
            "Item stock updated"
        );

        self.get_item(ItemScope::All, item_id).await
    }

    /// Every item with price, stock and vendor name
    pub async fn browse_catalog(&self) -> AppResult<Vec<CatalogEntry>> {
        let entries = sqlx::query_as::<_, CatalogEntry>(
            r#"
            SELECT i.id, i.description, i.price, i.stock,
                   CONCAT(v.first_name, ' ', v.last_name) AS vendor_name
            FROM items i
            JOIN users v ON v.id = i.vendor_id
            ORDER BY i.description
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> AuthUser {
        AuthUser {
            user_id: 11,
            username: "actor".into(),
            role,
            permissions: role.permission_strings(),
        }
    }

    #[test]
    fn test_vendors_own_their_items() {
        assert_eq!(resolve_vendor(&actor(Role::Vendor), Some(99)).unwrap(), 11);
        assert_eq!(resolve_vendor(&actor(Role::VendorAdmin), None).unwrap(), 11);
    }

    #[test]
    fn test_superadmin_must_pick_vendor() {
        assert_eq!(resolve_vendor(&actor(Role::Superadmin), Some(5)).unwrap(), 5);
        assert!(matches!(
            resolve_vendor(&actor(Role::Superadmin), None),
            Err(AppError::Validation { .. })
        ));
    }

    #[test]
    fn test_customer_roles_cannot_create_items() {
        assert!(matches!(
            resolve_vendor(&actor(Role::CustomerAdmin), Some(5)),
            Err(AppError::InsufficientPermissions)
        ));
    }
}
