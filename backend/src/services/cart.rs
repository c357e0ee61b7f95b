//! Shopping cart service
//!
//! A customer's cart is the set of their `cart` rows in status `active`.
//! Adding an item already in the cart merges into the existing row.

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{validate_quantity, Cart, CartLine, CartStatus};
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};
use crate::services::user::check;

/// Cart service
#[derive(Clone)]
pub struct CartService {
    db: PgPool,
}

/// Input for adding an item to the cart
#[derive(Debug, Deserialize)]
pub struct AddToCartInput {
    pub item_id: i64,
    pub quantity: i32,
}

#[derive(FromRow)]
struct CartRow {
    item_id: i64,
    description: String,
    quantity: i32,
    price: Decimal,
}

impl CartService {
    /// Create a new CartService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Active cart of a customer
    pub async fn get_cart(&self, user_id: i64) -> AppResult<Cart> {
        let rows = sqlx::query_as::<_, CartRow>(
            r#"
            SELECT c.item_id, i.description, c.quantity, i.price
            FROM cart c
            JOIN items i ON i.id = c.item_id
            JOIN cart_status cs ON cs.id = c.status_id
            WHERE c.user_id = $1 AND cs.status_name = $2
            ORDER BY c.id
            "#,
        )
        .bind(user_id)
        .bind(CartStatus::Active.as_str())
        .fetch_all(&self.db)
        .await?;

        let lines = rows
            .into_iter()
            .map(|r| CartLine::new(r.item_id, r.description, r.quantity, r.price))
            .collect();

        Ok(Cart::from_lines(lines))
    }

    /// Add an item, merging with an existing active row
    pub async fn add_to_cart(&self, user_id: i64, input: AddToCartInput) -> AppResult<Cart> {
        if input.quantity < 1 {
            return Err(AppError::validation("quantity", "Quantity must be at least 1"));
        }

        let mut tx = self.db.begin().await?;

        let stock = sqlx::query_scalar::<_, i32>("SELECT stock FROM items WHERE id = $1")
            .bind(input.item_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))?;

        let existing = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT c.quantity
            FROM cart c
            JOIN cart_status cs ON cs.id = c.status_id
            WHERE c.user_id = $1 AND c.item_id = $2 AND cs.status_name = $3
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(input.item_id)
        .bind(CartStatus::Active.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let merged = existing.unwrap_or(0).saturating_add(input.quantity);
        check("quantity", validate_quantity(merged, stock))?;

        if existing.is_some() {
            sqlx::query(
                r#"
                UPDATE cart
                SET quantity = $1, updated_by = $2, updated_on = NOW()
                WHERE user_id = $2 AND item_id = $3
                  AND status_id = (SELECT id FROM cart_status WHERE status_name = $4)
                "#,
            )
            .bind(merged)
            .bind(user_id)
            .bind(input.item_id)
            .bind(CartStatus::Active.as_str())
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO cart (user_id, item_id, quantity, status_id, created_by, updated_by)
                SELECT $1, $2, $3, id, $1, $1 FROM cart_status WHERE status_name = $4
                "#,
            )
            .bind(user_id)
            .bind(input.item_id)
            .bind(merged)
            .bind(CartStatus::Active.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(user_id, item_id = input.item_id, quantity = merged, "Cart line saved");

        self.get_cart(user_id).await
    }

    /// Replace the quantity of a cart line
    pub async fn set_quantity(&self, user_id: i64, item_id: i64, quantity: i32) -> AppResult<Cart> {
        let mut tx = self.db.begin().await?;

        let stock = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT i.stock
            FROM cart c
            JOIN items i ON i.id = c.item_id
            JOIN cart_status cs ON cs.id = c.status_id
            WHERE c.user_id = $1 AND c.item_id = $2 AND cs.status_name = $3
            FOR UPDATE OF c
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .bind(CartStatus::Active.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item".to_string()))?;

        check("quantity", validate_quantity(quantity, stock))?;

        sqlx::query(
            r#"
            UPDATE cart
            SET quantity = $1, updated_by = $2, updated_on = NOW()
            WHERE user_id = $2 AND item_id = $3
              AND status_id = (SELECT id FROM cart_status WHERE status_name = $4)
            "#,
        )
        .bind(quantity)
        .bind(user_id)
        .bind(item_id)
        .bind(CartStatus::Active.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_cart(user_id).await
    }

    /// Remove an item from the cart
    pub async fn remove_from_cart(&self, user_id: i64, item_id: i64) -> AppResult<Cart> {
        let result = sqlx::query(
            r#"
            DELETE FROM cart
            WHERE user_id = $1 AND item_id = $2
              AND status_id = (SELECT id FROM cart_status WHERE status_name = $3)
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .bind(CartStatus::Active.as_str())
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Cart item".to_string()));
        }

        self.get_cart(user_id).await
    }

    /// Remove every active line
    pub async fn clear_cart(&self, user_id: i64) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM cart
            WHERE user_id = $1
              AND status_id = (SELECT id FROM cart_status WHERE status_name = $2)
            "#,
        )
        .bind(user_id)
        .bind(CartStatus::Active.as_str())
        .execute(&self.db)
        .await?;

        tracing::debug!(user_id, removed = result.rows_affected(), "Cart cleared");

        Ok(())
    }
}
