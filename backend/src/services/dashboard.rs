//! Admin dashboard metrics

use rust_decimal::Decimal;
use serde::Serialize;
use shared::{InvoiceStatus, Role};
use sqlx::{FromRow, PgPool};

use crate::error::AppResult;

/// Items with fewer units than this are reported as low stock
pub const LOW_STOCK_THRESHOLD: i32 = 5;

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow, Default)]
pub struct DashboardMetrics {
    pub user_count: i64,
    pub active_users: i64,
    pub item_count: i64,
    pub low_stock_items: i64,
    pub unpaid_invoices: i64,
    pub paid_invoices: i64,
    pub outstanding_amount: Decimal,
    pub collected_amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub welcome: String,
    pub role: Role,
    pub metrics: DashboardMetrics,
}

pub fn welcome_message(role: Role, first_name: &str) -> String {
    format!("Welcome, {}! You are signed in as {}.", first_name, role.label())
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_dashboard(&self, user_id: i64, role: Role) -> AppResult<Dashboard> {
        let first_name = sqlx::query_scalar::<_, String>("SELECT first_name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .unwrap_or_default();

        let metrics = self.metrics().await?;

        Ok(Dashboard {
            welcome: welcome_message(role, &first_name),
            role,
            metrics,
        })
    }

    pub async fn metrics(&self) -> AppResult<DashboardMetrics> {
        let metrics = sqlx::query_as::<_, DashboardMetrics>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS user_count,
                (SELECT COUNT(*) FROM users WHERE is_active) AS active_users,
                (SELECT COUNT(*) FROM items) AS item_count,
                (SELECT COUNT(*) FROM items WHERE stock < $1) AS low_stock_items,
                COUNT(*) FILTER (WHERE s.status_name = $2) AS unpaid_invoices,
                COUNT(*) FILTER (WHERE s.status_name = $3) AS paid_invoices,
                COALESCE(SUM(inv.total_amount) FILTER (WHERE s.status_name = $2), 0)
                    AS outstanding_amount,
                COALESCE(SUM(inv.total_amount) FILTER (WHERE s.status_name = $3), 0)
                    AS collected_amount
            FROM invoices inv
            JOIN statuses s ON s.id = inv.status_id
            "#,
        )
        .bind(LOW_STOCK_THRESHOLD)
        .bind(InvoiceStatus::Unpaid.as_str())
        .bind(InvoiceStatus::Paid.as_str())
        .fetch_one(&self.db)
        .await?;

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_names_role() {
        assert_eq!(
            welcome_message(Role::VendorAdmin, "Sam"),
            "Welcome, Sam! You are signed in as Vendor Admin."
        );
    }
}
