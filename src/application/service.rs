use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::domain::{
    breakdown_by, Cents, DetailedOrder, DimensionBreakdown, ExpenseRecord, FinancialComparison,
    FinancialMetrics, OrderId, OrderItemRecord, OrderRecord, OrderStatus, Period, PeriodKind,
    TimeSeriesPoint,
};
use crate::storage::Repository;

use super::error::AppError;
use super::reporting::ReportSections;

/// Application service providing the metrics and reporting operations.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct ReportService {
    repo: Repository,
}

impl ReportService {
    /// Create a new report service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Record entry
    // ========================

    /// Record a new order.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_order(
        &self,
        amount_cents: Cents,
        shipping_cents: Cents,
        status: OrderStatus,
        source: Option<String>,
        customer_name: Option<String>,
        phone: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<OrderRecord, AppError> {
        if amount_cents < 0 || shipping_cents < 0 {
            return Err(AppError::InvalidAmount(
                "Order amounts must not be negative".to_string(),
            ));
        }

        let mut order =
            OrderRecord::new(amount_cents, status, created_at).with_shipping(shipping_cents);
        if let Some(source) = source {
            order = order.with_source(source);
        }
        if let Some(name) = customer_name {
            order = order.with_customer(name);
        }
        if let Some(phone) = phone {
            order = order.with_phone(phone);
        }

        self.repo.save_order(&order).await?;
        Ok(order)
    }

    /// Record an expense.
    pub async fn record_expense(
        &self,
        amount_cents: Cents,
        category: Option<String>,
        incurred_at: DateTime<Utc>,
    ) -> Result<ExpenseRecord, AppError> {
        if amount_cents < 0 {
            return Err(AppError::InvalidAmount(
                "Expense amount must not be negative".to_string(),
            ));
        }

        let mut expense = ExpenseRecord::new(amount_cents, incurred_at);
        if let Some(category) = category {
            expense = expense.with_category(category);
        }

        self.repo.save_expense(&expense).await?;
        Ok(expense)
    }

    /// Record a line item on an existing order.
    pub async fn record_order_item(
        &self,
        order_id: OrderId,
        product_name: String,
        variant_title: Option<String>,
        quantity: i64,
        unit_price_cents: Cents,
        unit_cost_cents: Option<Cents>,
    ) -> Result<OrderItemRecord, AppError> {
        if quantity <= 0 {
            return Err(AppError::InvalidQuantity(quantity));
        }
        if self.repo.get_order(order_id).await?.is_none() {
            return Err(AppError::OrderNotFound(order_id.to_string()));
        }

        let mut item = OrderItemRecord::new(order_id, product_name, quantity, unit_price_cents);
        if let Some(variant) = variant_title {
            item = item.with_variant(variant);
        }
        if let Some(cost) = unit_cost_cents {
            item = item.with_unit_cost(cost);
        }

        self.repo.save_order_item(&item).await?;
        Ok(item)
    }

    // ========================
    // Metrics
    // ========================

    /// Fetch and aggregate the metrics for one period.
    pub async fn metrics_for(&self, period: &Period) -> Result<FinancialMetrics, AppError> {
        let orders = self.repo.list_eligible_orders(period).await?;
        let expenses = self.repo.list_expenses(period).await?;
        let items = self.repo.list_items_in_period(period).await?;
        debug!(
            "aggregating {}: {} orders, {} expenses, {} items",
            period.label,
            orders.len(),
            expenses.len(),
            items.len()
        );
        Ok(FinancialMetrics::aggregate(&orders, &expenses, &items))
    }

    /// Compare a period against the adjacent earlier period of the same kind.
    pub async fn compare_with_previous(
        &self,
        period: &Period,
    ) -> Result<FinancialComparison, AppError> {
        let current = self.metrics_for(period).await?;
        let previous = self.metrics_for(&period.previous()).await?;
        Ok(FinancialComparison::compare(current, previous))
    }

    /// Build the trend series for a period: one independent fetch+aggregate
    /// per sub-period, through the exact same code path as a single-period
    /// request. O(sub-periods) round trips, by design.
    pub async fn time_series(&self, period: &Period) -> Result<Vec<TimeSeriesPoint>, AppError> {
        let mut points = Vec::new();
        for sub_period in period.sub_periods() {
            let metrics = self.metrics_for(&sub_period).await?;
            points.push(TimeSeriesPoint::from_metrics(&sub_period, &metrics));
        }
        Ok(points)
    }

    // ========================
    // Breakdowns
    // ========================

    /// Revenue grouped by sales channel, ranked by amount.
    pub async fn revenue_by_source(
        &self,
        period: &Period,
    ) -> Result<Vec<DimensionBreakdown>, AppError> {
        let orders = self.repo.list_eligible_orders(period).await?;
        Ok(breakdown_by(
            &orders,
            |order| order.source_key(),
            |order| order.total_cents(),
        ))
    }

    /// Expenses grouped by category, ranked by amount.
    pub async fn expenses_by_category(
        &self,
        period: &Period,
    ) -> Result<Vec<DimensionBreakdown>, AppError> {
        let expenses = self.repo.list_expenses(period).await?;
        Ok(breakdown_by(
            &expenses,
            |expense| expense.category_key(),
            |expense| expense.amount_cents,
        ))
    }

    // ========================
    // Reports
    // ========================

    /// Fetch every order of the period (any status) with its line items.
    pub async fn detailed_orders(&self, period: &Period) -> Result<Vec<DetailedOrder>, AppError> {
        let orders = self.repo.list_orders(period).await?;
        let mut detailed = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.repo.list_items_for_order(order.id).await?;
            detailed.push(DetailedOrder { order, items });
        }
        Ok(detailed)
    }

    /// Compose the full multi-section report for a period.
    pub async fn compose_report(
        &self,
        period: &Period,
        generated_at: DateTime<Utc>,
    ) -> Result<ReportSections, AppError> {
        let metrics = self.metrics_for(period).await?;
        let series = self.time_series(period).await?;
        let orders = self.detailed_orders(period).await?;
        info!(
            "composed report for {}: {} orders, {} trend points",
            period.label,
            orders.len(),
            series.len()
        );
        Ok(ReportSections::compose(
            period,
            generated_at,
            &metrics,
            &series,
            &orders,
        ))
    }

    /// Resolve a period from query parameters, failing fast on out-of-range
    /// month or quarter indices.
    pub fn period_from_query(
        &self,
        kind: PeriodKind,
        year: i32,
        month: Option<u32>,
        quarter: Option<u32>,
    ) -> Result<Period, AppError> {
        Ok(Period::from_query(kind, year, month, quarter)?)
    }
}
