//! Invoice service: cart checkout, listing, detail and payment

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    invoice_total, line_total, stock_covers, CartStatus, InvoiceNumber, InvoiceScope,
    InvoiceStatus,
};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;

/// Invoice service
#[derive(Clone)]
pub struct InvoiceService {
    db: PgPool,
    number_prefix: String,
}

/// An invoice header
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub customer_id: i64,
    #[sqlx(try_from = "String")]
    pub status: InvoiceStatus,
    pub invoice_date: NaiveDate,
    pub total_amount: Decimal,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

/// Invoice row for listings and CSV export
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InvoiceSummary {
    pub id: i64,
    pub invoice_number: String,
    pub customer_id: i64,
    pub customer_name: String,
    #[sqlx(try_from = "String")]
    pub status: InvoiceStatus,
    pub invoice_date: NaiveDate,
    pub total_amount: Decimal,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

/// Customer block printed on an invoice
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// One invoiced item
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InvoiceLine {
    pub item_id: i64,
    pub description: String,
    pub vendor_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Invoice with customer and items
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub customer: CustomerInfo,
    pub items: Vec<InvoiceLine>,
}

#[derive(FromRow)]
struct CheckoutRow {
    cart_id: i64,
    item_id: i64,
    description: String,
    quantity: i32,
    price: Decimal,
    stock: i32,
    #[sqlx(try_from = "String")]
    status: CartStatus,
}

const INVOICE_COLUMNS: &str = r#"
    inv.id, inv.invoice_number, inv.customer_id, s.status_name AS status,
    inv.invoice_date, inv.total_amount, inv.created_by, inv.updated_by,
    inv.created_on, inv.updated_on
"#;

/// SQL predicate restricting `inv` to a scope; `param` is the placeholder index
/// for the scope's user id
pub(crate) fn scope_clause(scope: InvoiceScope, param: usize) -> (String, Option<i64>) {
    match scope {
        InvoiceScope::All => ("TRUE".to_string(), None),
        InvoiceScope::Customer(id) => (format!("inv.customer_id = ${}", param), Some(id)),
        InvoiceScope::Vendor(id) => (
            format!(
                "EXISTS (SELECT 1 FROM invoice_items ii JOIN items it ON it.id = ii.item_id \
                 WHERE ii.invoice_id = inv.id AND it.vendor_id = ${})",
                param
            ),
            Some(id),
        ),
    }
}

/// Check requested quantities against stock, summing repeated items
pub(crate) fn check_stock(lines: &[(i64, &str, i32, i32)]) -> AppResult<()> {
    let mut requested: BTreeMap<i64, (&str, i32, i32)> = BTreeMap::new();
    for &(item_id, description, quantity, stock) in lines {
        let entry = requested.entry(item_id).or_insert((description, 0, stock));
        entry.1 = entry.1.saturating_add(quantity);
    }

    let totals: Vec<(i32, i32)> = requested.values().map(|&(_, qty, stock)| (qty, stock)).collect();
    if stock_covers(&totals) {
        return Ok(());
    }

    let (description, quantity, stock) = requested
        .into_values()
        .find(|&(_, qty, stock)| qty > stock)
        .unwrap_or_default();
    Err(AppError::InsufficientStock(format!(
        "Only {} of '{}' in stock, {} requested",
        stock, description, quantity
    )))
}

/// Serialize rows as CSV with a header line
pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in data {
        wtr.serialize(record)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
}

impl InvoiceService {
    /// Create a new InvoiceService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            number_prefix: config.invoice.number_prefix.clone(),
        }
    }

    /// Convert the customer's active cart into an unpaid invoice
    pub async fn generate_invoice_from_cart(&self, user_id: i64) -> AppResult<Invoice> {
        let mut tx = self.db.begin().await?;

        let rows = sqlx::query_as::<_, CheckoutRow>(
            r#"
            SELECT c.id AS cart_id, c.item_id, i.description, c.quantity, i.price, i.stock,
                   cs.status_name AS status
            FROM cart c
            JOIN items i ON i.id = c.item_id
            JOIN cart_status cs ON cs.id = c.status_id
            WHERE c.user_id = $1 AND cs.status_name = $2
            ORDER BY c.id
            FOR UPDATE OF c, i
            "#,
        )
        .bind(user_id)
        .bind(CartStatus::Active.as_str())
        .fetch_all(&mut *tx)
        .await?;

        if rows.is_empty() {
            return Err(AppError::EmptyCart);
        }

        let stock_lines: Vec<(i64, &str, i32, i32)> = rows
            .iter()
            .map(|r| (r.item_id, r.description.as_str(), r.quantity, r.stock))
            .collect();
        check_stock(&stock_lines)?;

        let total = invoice_total(rows.iter().map(|r| (r.quantity, r.price)));

        // Numbering reads the yearly count, so concurrent checkouts take turns
        sqlx::query("LOCK TABLE invoices IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let invoices_this_year = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM invoices
            WHERE EXTRACT(YEAR FROM invoice_date) = EXTRACT(YEAR FROM CURRENT_DATE)
            "#,
        )
        .fetch_one(&mut *tx)
        .await?;

        let mut number =
            InvoiceNumber::next(self.number_prefix.as_str(), invoices_this_year, user_id);

        // An earlier year may already hold this sequence for the same customer
        while sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM invoices WHERE invoice_number = $1)",
        )
        .bind(number.to_string())
        .fetch_one(&mut *tx)
        .await?
        {
            number.sequence += 1;
        }

        let invoice_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO invoices (invoice_number, customer_id, status_id, invoice_date,
                                  total_amount, created_by, updated_by)
            SELECT $1, $2, id, CURRENT_DATE, $3, $2, $2 FROM statuses WHERE status_name = $4
            RETURNING id
            "#,
        )
        .bind(number.to_string())
        .bind(user_id)
        .bind(total)
        .bind(InvoiceStatus::Unpaid.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "invoice_number"))?;

        for row in &rows {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (invoice_id, item_id, quantity, unit_price, line_total,
                                           created_by, updated_by)
                VALUES ($1, $2, $3, $4, $5, $6, $6)
                "#,
            )
            .bind(invoice_id)
            .bind(row.item_id)
            .bind(row.quantity)
            .bind(row.price)
            .bind(line_total(row.quantity, row.price))
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE items SET stock = stock - $1, updated_by = $2, updated_on = NOW()
                WHERE id = $3
                "#,
            )
            .bind(row.quantity)
            .bind(user_id)
            .bind(row.item_id)
            .execute(&mut *tx)
            .await?;
        }

        let cart_ids: Vec<i64> = rows.iter().map(|r| r.cart_id).collect();
        let converted = rows
            .iter()
            .try_fold(CartStatus::Converted, |_, row| row.status.convert())?;
        sqlx::query(
            r#"
            UPDATE cart
            SET status_id = (SELECT id FROM cart_status WHERE status_name = $1),
                invoice_id = $2, updated_by = $3, updated_on = NOW()
            WHERE id = ANY($4)
            "#,
        )
        .bind(converted.as_str())
        .bind(invoice_id)
        .bind(user_id)
        .bind(&cart_ids)
        .execute(&mut *tx)
        .await?;

        let invoice = Self::fetch_invoice(&mut tx, invoice_id).await?;

        tx.commit().await?;

        tracing::info!(
            invoice_id,
            invoice_number = %invoice.invoice_number,
            customer_id = user_id,
            lines = rows.len(),
            total = %total,
            "Invoice generated from cart"
        );

        Ok(invoice)
    }

    async fn fetch_invoice(
        tx: &mut Transaction<'_, Postgres>,
        invoice_id: i64,
    ) -> AppResult<Invoice> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {} FROM invoices inv JOIN statuses s ON s.id = inv.status_id WHERE inv.id = $1",
            INVOICE_COLUMNS
        ))
        .bind(invoice_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(invoice)
    }

    /// List invoices in a scope, newest first
    pub async fn list_invoices(&self, scope: InvoiceScope) -> AppResult<Vec<InvoiceSummary>> {
        let (filter, scope_id) = scope_clause(scope, 1);
        let sql = format!(
            r#"
            SELECT inv.id, inv.invoice_number, inv.customer_id,
                   CONCAT(u.first_name, ' ', u.last_name) AS customer_name,
                   s.status_name AS status, inv.invoice_date, inv.total_amount,
                   inv.created_on, inv.updated_on
            FROM invoices inv
            JOIN statuses s ON s.id = inv.status_id
            JOIN users u ON u.id = inv.customer_id
            WHERE {}
            ORDER BY inv.invoice_date DESC, inv.id DESC
            "#,
            filter
        );

        let mut query = sqlx::query_as::<_, InvoiceSummary>(&sql);
        if let Some(id) = scope_id {
            query = query.bind(id);
        }

        Ok(query.fetch_all(&self.db).await?)
    }

    /// Invoice header by number; outside the scope it does not exist
    pub async fn find_invoice(&self, number: &str, scope: InvoiceScope) -> AppResult<Invoice> {
        InvoiceNumber::parse(number)?;

        let (filter, scope_id) = scope_clause(scope, 2);
        let sql = format!(
            "SELECT {} FROM invoices inv JOIN statuses s ON s.id = inv.status_id \
             WHERE inv.invoice_number = $1 AND {}",
            INVOICE_COLUMNS, filter
        );

        let mut query = sqlx::query_as::<_, Invoice>(&sql).bind(number);
        if let Some(id) = scope_id {
            query = query.bind(id);
        }

        query
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Invoice".to_string()))
    }

    /// Invoice with customer details and lines
    pub async fn get_invoice(&self, number: &str, scope: InvoiceScope) -> AppResult<InvoiceDetail> {
        let invoice = self.find_invoice(number, scope).await?;

        let customer = sqlx::query_as::<_, CustomerInfo>(
            r#"
            SELECT id, CONCAT(first_name, ' ', last_name) AS name, email, phone
            FROM users WHERE id = $1
            "#,
        )
        .bind(invoice.customer_id)
        .fetch_one(&self.db)
        .await?;

        let items = sqlx::query_as::<_, InvoiceLine>(
            r#"
            SELECT ii.item_id, i.description,
                   CONCAT(v.first_name, ' ', v.last_name) AS vendor_name,
                   ii.quantity, ii.unit_price, ii.line_total
            FROM invoice_items ii
            JOIN items i ON i.id = ii.item_id
            JOIN users v ON v.id = i.vendor_id
            WHERE ii.invoice_id = $1
            ORDER BY ii.id
            "#,
        )
        .bind(invoice.id)
        .fetch_all(&self.db)
        .await?;

        Ok(InvoiceDetail {
            invoice,
            customer,
            items,
        })
    }

    /// Mark an unpaid invoice as paid
    pub async fn pay_invoice(&self, number: &str, actor: &AuthUser) -> AppResult<Invoice> {
        let invoice = self.find_invoice(number, actor.invoice_scope()).await?;

        let mut tx = self.db.begin().await?;

        let current = sqlx::query_scalar::<_, String>(
            r#"
            SELECT s.status_name FROM invoices inv
            JOIN statuses s ON s.id = inv.status_id
            WHERE inv.id = $1
            FOR UPDATE OF inv
            "#,
        )
        .bind(invoice.id)
        .fetch_one(&mut *tx)
        .await?;

        let next = InvoiceStatus::from_name(&current)?.transition_to(InvoiceStatus::Paid)?;

        sqlx::query(
            r#"
            UPDATE invoices
            SET status_id = (SELECT id FROM statuses WHERE status_name = $1),
                updated_by = $2, updated_on = NOW()
            WHERE id = $3
            "#,
        )
        .bind(next.as_str())
        .bind(actor.user_id)
        .bind(invoice.id)
        .execute(&mut *tx)
        .await?;

        let paid = Self::fetch_invoice(&mut tx, invoice.id).await?;

        tx.commit().await?;

        tracing::info!(
            invoice_number = %paid.invoice_number,
            paid_by = actor.user_id,
            amount = %paid.total_amount,
            "Invoice paid"
        );

        Ok(paid)
    }
}
