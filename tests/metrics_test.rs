mod common;

use anyhow::Result;
use common::{seed_customer_order, seed_expense, seed_order, test_service};
use sartoria::application::AppError;
use sartoria::domain::{OrderStatus, Period, PeriodKind};

fn march_2025() -> Period {
    Period::from_query(PeriodKind::Month, 2025, Some(3), None).unwrap()
}

#[tokio::test]
async fn test_metrics_pipeline_basic() -> Result<()> {
    let (service, _temp) = test_service().await?;

    // Paid order with shipping, pending order excluded from revenue
    seed_order(&service, 10_000, 500, OrderStatus::Paid, "2025-03-05").await?;
    seed_order(&service, 5_000, 0, OrderStatus::Pending, "2025-03-10").await?;
    seed_expense(&service, 1_000, Some("fabric"), "2025-03-12").await?;

    // Records outside the period must not leak in
    seed_order(&service, 99_000, 0, OrderStatus::Paid, "2025-02-15").await?;
    seed_expense(&service, 7_000, Some("rent"), "2025-04-02").await?;

    let metrics = service.metrics_for(&march_2025()).await?;
    assert_eq!(metrics.revenue, 10_500);
    assert_eq!(metrics.cogs, None);
    assert_eq!(metrics.gross_profit, None);
    assert_eq!(metrics.expenses, 1_500); // 1000 explicit + 500 shipping
    assert_eq!(metrics.net_profit, 9_000);
    assert_eq!(metrics.order_count, 1);
    assert_eq!(metrics.aov, 10_500);

    Ok(())
}

#[tokio::test]
async fn test_cogs_from_costed_items_only() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let order = seed_order(&service, 10_000, 0, OrderStatus::Paid, "2025-03-05").await?;
    service
        .record_order_item(order.id, "Jacket".into(), None, 2, 4_000, Some(300))
        .await?;
    service
        .record_order_item(order.id, "Scarf".into(), None, 1, 2_000, None)
        .await?;

    let metrics = service.metrics_for(&march_2025()).await?;
    // Uncosted item excluded from COGS, not counted as zero-cost
    assert_eq!(metrics.cogs, Some(600));
    assert_eq!(metrics.gross_profit, Some(9_400));
    assert_eq!(metrics.net_profit, 9_400);

    Ok(())
}

#[tokio::test]
async fn test_revenue_eligible_statuses() -> Result<()> {
    let (service, _temp) = test_service().await?;

    seed_order(&service, 1_000, 0, OrderStatus::Paid, "2025-03-01").await?;
    seed_order(&service, 2_000, 0, OrderStatus::Completed, "2025-03-02").await?;
    seed_order(&service, 4_000, 0, OrderStatus::Shipped, "2025-03-03").await?;
    seed_order(&service, 8_000, 0, OrderStatus::Pending, "2025-03-04").await?;
    seed_order(&service, 16_000, 0, OrderStatus::Cancelled, "2025-03-05").await?;
    seed_order(&service, 32_000, 0, OrderStatus::Draft, "2025-03-06").await?;

    let metrics = service.metrics_for(&march_2025()).await?;
    assert_eq!(metrics.revenue, 7_000);
    assert_eq!(metrics.order_count, 3);

    Ok(())
}

#[tokio::test]
async fn test_comparison_with_previous_period() -> Result<()> {
    let (service, _temp) = test_service().await?;

    // February: 10000 revenue. March: 15000.
    seed_order(&service, 10_000, 0, OrderStatus::Paid, "2025-02-10").await?;
    seed_order(&service, 15_000, 0, OrderStatus::Paid, "2025-03-10").await?;

    let comparison = service.compare_with_previous(&march_2025()).await?;
    assert_eq!(comparison.current.revenue, 15_000);
    assert_eq!(comparison.previous.revenue, 10_000);
    assert_eq!(comparison.changes.revenue, 5_000); // +50% in basis points
    assert_eq!(comparison.changes.order_count, 0);

    Ok(())
}

#[tokio::test]
async fn test_comparison_zero_baseline() -> Result<()> {
    let (service, _temp) = test_service().await?;

    // Nothing in February, 5000 in March
    seed_order(&service, 5_000, 0, OrderStatus::Paid, "2025-03-10").await?;

    let comparison = service.compare_with_previous(&march_2025()).await?;
    assert_eq!(comparison.previous.revenue, 0);
    assert_eq!(comparison.changes.revenue, 10_000);
    assert_eq!(comparison.changes.expenses, 0);

    Ok(())
}

#[tokio::test]
async fn test_revenue_by_source_breakdown() -> Result<()> {
    let (service, _temp) = test_service().await?;

    seed_customer_order(&service, 5_000, "Ada", "walk-in", "2025-03-01").await?;
    seed_customer_order(&service, 2_000, "Grace", "instagram", "2025-03-02").await?;
    seed_customer_order(&service, 1_000, "Edith", "instagram", "2025-03-03").await?;
    // No source: lands in the Other bucket
    seed_order(&service, 500, 0, OrderStatus::Paid, "2025-03-04").await?;

    let breakdown = service.revenue_by_source(&march_2025()).await?;
    assert_eq!(breakdown.len(), 3);
    assert_eq!(breakdown[0].key, "walk-in");
    assert_eq!(breakdown[0].amount, 5_000);
    assert_eq!(breakdown[1].key, "instagram");
    assert_eq!(breakdown[1].amount, 3_000);
    assert_eq!(breakdown[1].count, 2);
    assert_eq!(breakdown[2].key, "Other");

    let share_sum: i64 = breakdown.iter().map(|g| g.share).sum();
    assert!((share_sum - 10_000).abs() <= breakdown.len() as i64 - 1);

    Ok(())
}

#[tokio::test]
async fn test_expenses_by_category_breakdown() -> Result<()> {
    let (service, _temp) = test_service().await?;

    seed_expense(&service, 3_000, Some("fabric"), "2025-03-01").await?;
    seed_expense(&service, 1_000, Some("fabric"), "2025-03-05").await?;
    seed_expense(&service, 2_000, Some("rent"), "2025-03-10").await?;
    seed_expense(&service, 500, None, "2025-03-15").await?;

    let breakdown = service.expenses_by_category(&march_2025()).await?;
    assert_eq!(breakdown.len(), 3);
    assert_eq!(breakdown[0].key, "fabric");
    assert_eq!(breakdown[0].amount, 4_000);
    assert_eq!(breakdown[0].count, 2);
    assert_eq!(breakdown[2].key, "Other");

    Ok(())
}

#[tokio::test]
async fn test_invalid_period_query_fails_fast() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.period_from_query(PeriodKind::Month, 2025, Some(13), None);
    assert!(matches!(result, Err(AppError::InvalidPeriod(_))));

    let result = service.period_from_query(PeriodKind::Quarter, 2025, None, Some(0));
    assert!(matches!(result, Err(AppError::InvalidPeriod(_))));

    Ok(())
}

#[tokio::test]
async fn test_item_for_missing_order_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service
        .record_order_item(uuid::Uuid::new_v4(), "Coat".into(), None, 1, 5_000, None)
        .await;
    assert!(matches!(result, Err(AppError::OrderNotFound(_))));

    let order = seed_order(&service, 1_000, 0, OrderStatus::Paid, "2025-03-01").await?;
    let result = service
        .record_order_item(order.id, "Coat".into(), None, 0, 5_000, None)
        .await;
    assert!(matches!(result, Err(AppError::InvalidQuantity(0))));

    Ok(())
}

#[tokio::test]
async fn test_period_boundary_is_half_open() -> Result<()> {
    let (service, _temp) = test_service().await?;

    // Exactly on the start boundary: included. Exactly on the end
    // boundary: excluded (it is the start of April).
    seed_order(&service, 1_000, 0, OrderStatus::Paid, "2025-03-01").await?;
    seed_order(&service, 2_000, 0, OrderStatus::Paid, "2025-04-01").await?;

    let march = service.metrics_for(&march_2025()).await?;
    assert_eq!(march.revenue, 1_000);

    let april = Period::from_query(PeriodKind::Month, 2025, Some(4), None).unwrap();
    let april_metrics = service.metrics_for(&april).await?;
    assert_eq!(april_metrics.revenue, 2_000);

    Ok(())
}
