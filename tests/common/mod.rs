// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sartoria::application::ReportService;
use sartoria::domain::{Cents, OrderRecord, OrderStatus};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(ReportService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = ReportService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Record a plain order with no customer or source details.
pub async fn seed_order(
    service: &ReportService,
    amount: Cents,
    shipping: Cents,
    status: OrderStatus,
    date: &str,
) -> Result<OrderRecord> {
    Ok(service
        .record_order(amount, shipping, status, None, None, None, parse_date(date))
        .await?)
}

/// Record an order attributed to a customer and sales channel.
pub async fn seed_customer_order(
    service: &ReportService,
    amount: Cents,
    customer: &str,
    source: &str,
    date: &str,
) -> Result<OrderRecord> {
    Ok(service
        .record_order(
            amount,
            0,
            OrderStatus::Paid,
            Some(source.to_string()),
            Some(customer.to_string()),
            None,
            parse_date(date),
        )
        .await?)
}

/// Record an expense under a category.
pub async fn seed_expense(
    service: &ReportService,
    amount: Cents,
    category: Option<&str>,
    date: &str,
) -> Result<()> {
    service
        .record_expense(amount, category.map(|c| c.to_string()), parse_date(date))
        .await?;
    Ok(())
}
