use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::debug;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    ExpenseRecord, OrderId, OrderItemRecord, OrderRecord, OrderStatus, Period,
};

use super::MIGRATION_001_INITIAL;

/// Revenue-bearing queries only see orders in the eligible status set.
const REVENUE_ELIGIBLE_FILTER: &str = "status IN ('paid', 'completed', 'shipped')";

/// Repository for persisting and querying orders, expenses and line items.
/// All period filters are half-open: `created_at >= start AND created_at < end`.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    /// Creates the database file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Order operations
    // ========================

    /// Save a new order to the database.
    pub async fn save_order(&self, order: &OrderRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, amount_cents, shipping_cents, status, source, customer_name, phone, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.id.to_string())
        .bind(order.amount_cents)
        .bind(order.shipping_cents)
        .bind(order.status.as_str())
        .bind(&order.source)
        .bind(&order.customer_name)
        .bind(&order.phone)
        .bind(order.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save order")?;
        Ok(())
    }

    /// Get an order by ID.
    pub async fn get_order(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, amount_cents, shipping_cents, status, source, customer_name, phone, created_at
            FROM orders
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch order")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_order(&row)?)),
            None => Ok(None),
        }
    }

    /// List revenue-eligible orders within a period. This is the fetch that
    /// feeds metrics, breakdowns and time series.
    pub async fn list_eligible_orders(&self, period: &Period) -> Result<Vec<OrderRecord>> {
        debug!("fetching eligible orders for {}", period.label);
        let query = format!(
            r#"
            SELECT id, amount_cents, shipping_cents, status, source, customer_name, phone, created_at
            FROM orders
            WHERE {} AND created_at >= ? AND created_at < ?
            ORDER BY created_at
            "#,
            REVENUE_ELIGIBLE_FILTER
        );

        let rows = sqlx::query(&query)
            .bind(period.start.to_rfc3339())
            .bind(period.end.to_rfc3339())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list eligible orders")?;

        rows.iter().map(Self::row_to_order).collect()
    }

    /// List every order within a period regardless of status, for the
    /// orders-detail report section.
    pub async fn list_orders(&self, period: &Period) -> Result<Vec<OrderRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, amount_cents, shipping_cents, status, source, customer_name, phone, created_at
            FROM orders
            WHERE created_at >= ? AND created_at < ?
            ORDER BY created_at
            "#,
        )
        .bind(period.start.to_rfc3339())
        .bind(period.end.to_rfc3339())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list orders")?;

        rows.iter().map(Self::row_to_order).collect()
    }

    // ========================
    // Expense operations
    // ========================

    /// Save a new expense to the database.
    pub async fn save_expense(&self, expense: &ExpenseRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO expenses (id, amount_cents, category, incurred_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(expense.id.to_string())
        .bind(expense.amount_cents)
        .bind(&expense.category)
        .bind(expense.incurred_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save expense")?;
        Ok(())
    }

    /// List expenses incurred within a period.
    pub async fn list_expenses(&self, period: &Period) -> Result<Vec<ExpenseRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, amount_cents, category, incurred_at
            FROM expenses
            WHERE incurred_at >= ? AND incurred_at < ?
            ORDER BY incurred_at
            "#,
        )
        .bind(period.start.to_rfc3339())
        .bind(period.end.to_rfc3339())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list expenses")?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    // ========================
    // Order item operations
    // ========================

    /// Save a new order item to the database.
    pub async fn save_order_item(&self, item: &OrderItemRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, product_name, variant_title, quantity, unit_price_cents, unit_cost_cents)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(item.order_id.to_string())
        .bind(&item.product_name)
        .bind(&item.variant_title)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.unit_cost_cents)
        .execute(&self.pool)
        .await
        .context("Failed to save order item")?;
        Ok(())
    }

    /// List items belonging to one order.
    pub async fn list_items_for_order(&self, order_id: OrderId) -> Result<Vec<OrderItemRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, product_name, variant_title, quantity, unit_price_cents, unit_cost_cents
            FROM order_items
            WHERE order_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(order_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list items for order")?;

        rows.iter().map(Self::row_to_item).collect()
    }

    /// List the items of all revenue-eligible orders within a period.
    /// Feeds COGS and the product breakdown.
    pub async fn list_items_in_period(&self, period: &Period) -> Result<Vec<OrderItemRecord>> {
        let query = format!(
            r#"
            SELECT i.id, i.order_id, i.product_name, i.variant_title, i.quantity, i.unit_price_cents, i.unit_cost_cents
            FROM order_items i
            JOIN orders o ON o.id = i.order_id
            WHERE o.{} AND o.created_at >= ? AND o.created_at < ?
            ORDER BY o.created_at, i.rowid
            "#,
            REVENUE_ELIGIBLE_FILTER
        );

        let rows = sqlx::query(&query)
            .bind(period.start.to_rfc3339())
            .bind(period.end.to_rfc3339())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list items in period")?;

        rows.iter().map(Self::row_to_item).collect()
    }

    // ========================
    // Row mapping
    // ========================

    fn row_to_order(row: &sqlx::sqlite::SqliteRow) -> Result<OrderRecord> {
        let id_str: String = row.get("id");
        let status_str: String = row.get("status");
        let created_at_str: String = row.get("created_at");

        Ok(OrderRecord {
            id: Uuid::parse_str(&id_str).context("Invalid order ID")?,
            amount_cents: row.get("amount_cents"),
            shipping_cents: row.get("shipping_cents"),
            status: OrderStatus::from_str(&status_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid order status: {}", status_str))?,
            source: row.get("source"),
            customer_name: row.get("customer_name"),
            phone: row.get("phone"),
            created_at: Self::parse_timestamp(&created_at_str)?,
        })
    }

    fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<ExpenseRecord> {
        let id_str: String = row.get("id");
        let incurred_at_str: String = row.get("incurred_at");

        Ok(ExpenseRecord {
            id: Uuid::parse_str(&id_str).context("Invalid expense ID")?,
            amount_cents: row.get("amount_cents"),
            category: row.get("category"),
            incurred_at: Self::parse_timestamp(&incurred_at_str)?,
        })
    }

    fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Result<OrderItemRecord> {
        let id_str: String = row.get("id");
        let order_id_str: String = row.get("order_id");

        Ok(OrderItemRecord {
            id: Uuid::parse_str(&id_str).context("Invalid order item ID")?,
            order_id: Uuid::parse_str(&order_id_str).context("Invalid order ID on item")?,
            product_name: row.get("product_name"),
            variant_title: row.get("variant_title"),
            quantity: row.get("quantity"),
            unit_price_cents: row.get("unit_price_cents"),
            unit_cost_cents: row.get("unit_cost_cents"),
        })
    }

    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
        Ok(DateTime::parse_from_rfc3339(s)
            .context("Invalid timestamp")?
            .with_timezone(&Utc))
    }
}
