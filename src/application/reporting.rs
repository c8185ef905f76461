use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    format_bps, format_cents, margin_bps, BasisPoints, Cents, DetailedOrder, FinancialMetrics,
    Period, TimeSeriesPoint,
};

/// One pre-formatted key/value line of the summary section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    pub label: String,
    pub value: String,
}

/// Headline metrics, pre-formatted for display. This is the only section
/// whose money values cross the renderer boundary as strings; everything
/// else stays in integer minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarySection {
    pub period_label: String,
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendRow {
    pub label: String,
    pub revenue: Cents,
    pub expenses: Cents,
    pub net_profit: Cents,
    pub margin: BasisPoints,
}

/// Per-sub-period trend rows plus a synthetic TOTAL row. The total is
/// recomputed from the parent period's own aggregation, not by summing the
/// rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSection {
    pub rows: Vec<TrendRow>,
    pub total: TrendRow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetailRow {
    pub customer: String,
    pub phone: String,
    pub status: String,
    pub source: String,
    pub item_count: i64,
    pub subtotal: Cents,
    pub shipping: Cents,
    pub total: Cents,
}

/// One row per fetched order; no further filtering is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersDetailSection {
    pub rows: Vec<OrderDetailRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRow {
    pub name: String,
    pub quantity: i64,
    pub revenue: Cents,
}

/// Items grouped by product name + variant, ranked by revenue descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductBreakdownSection {
    pub rows: Vec<ProductRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRow {
    pub name: String,
    pub phone: String,
    pub order_count: i64,
    pub total_spend: Cents,
}

/// Orders grouped by customer display name, ranked by spend descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerBreakdownSection {
    pub rows: Vec<CustomerRow>,
}

/// The document-agnostic report structure consumed by renderers: a
/// spreadsheet renderer maps each section to one sheet, a paginated
/// renderer to a titled block, a flat renderer takes the trend section
/// alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSections {
    pub summary: SummarySection,
    pub trend: TrendSection,
    pub orders: OrdersDetailSection,
    pub products: ProductBreakdownSection,
    pub customers: CustomerBreakdownSection,
}

impl ReportSections {
    /// Assemble all five sections from one period's aggregated data.
    pub fn compose(
        period: &Period,
        generated_at: DateTime<Utc>,
        metrics: &FinancialMetrics,
        series: &[TimeSeriesPoint],
        orders: &[DetailedOrder],
    ) -> Self {
        Self {
            summary: compose_summary(period, generated_at, metrics),
            trend: compose_trend(metrics, series),
            orders: compose_orders_detail(orders),
            products: compose_product_breakdown(orders),
            customers: compose_customer_breakdown(orders),
        }
    }

    /// Short-form variant: the first `n` rows of every ranked section, by
    /// the existing ranking, never re-aggregated. Summary and the trend
    /// TOTAL row are kept as-is.
    pub fn condensed(&self, n: usize) -> Self {
        Self {
            summary: self.summary.clone(),
            trend: TrendSection {
                rows: self.trend.rows.iter().take(n).cloned().collect(),
                total: self.trend.total.clone(),
            },
            orders: OrdersDetailSection {
                rows: self.orders.rows.iter().take(n).cloned().collect(),
            },
            products: ProductBreakdownSection {
                rows: self.products.rows.iter().take(n).cloned().collect(),
            },
            customers: CustomerBreakdownSection {
                rows: self.customers.rows.iter().take(n).cloned().collect(),
            },
        }
    }
}

fn optional_cents(value: Option<Cents>) -> String {
    match value {
        Some(cents) => format_cents(cents),
        None => "n/a".to_string(),
    }
}

fn compose_summary(
    period: &Period,
    generated_at: DateTime<Utc>,
    metrics: &FinancialMetrics,
) -> SummarySection {
    let row = |label: &str, value: String| SummaryRow {
        label: label.to_string(),
        value,
    };

    SummarySection {
        period_label: period.label.clone(),
        generated_at,
        rows: vec![
            row("Revenue", format_cents(metrics.revenue)),
            row("Cost of Goods Sold", optional_cents(metrics.cogs)),
            row("Gross Profit", optional_cents(metrics.gross_profit)),
            row("Expenses", format_cents(metrics.expenses)),
            row("Net Profit", format_cents(metrics.net_profit)),
            row(
                "Net Margin",
                format_bps(margin_bps(metrics.net_profit, metrics.revenue)),
            ),
            row("Orders", metrics.order_count.to_string()),
            row("Avg Order Value", format_cents(metrics.aov)),
        ],
    }
}

fn compose_trend(metrics: &FinancialMetrics, series: &[TimeSeriesPoint]) -> TrendSection {
    let rows = series
        .iter()
        .map(|point| TrendRow {
            label: point.label.clone(),
            revenue: point.revenue,
            expenses: point.expenses,
            net_profit: point.net_profit,
            margin: margin_bps(point.net_profit, point.revenue),
        })
        .collect();

    TrendSection {
        rows,
        total: TrendRow {
            label: "TOTAL".to_string(),
            revenue: metrics.revenue,
            expenses: metrics.expenses,
            net_profit: metrics.net_profit,
            margin: margin_bps(metrics.net_profit, metrics.revenue),
        },
    }
}

fn compose_orders_detail(orders: &[DetailedOrder]) -> OrdersDetailSection {
    let rows = orders
        .iter()
        .map(|detailed| OrderDetailRow {
            customer: detailed.order.customer_key(),
            phone: detailed.order.phone.clone().unwrap_or_default(),
            status: detailed.order.status.to_string(),
            source: detailed.order.source_key(),
            item_count: detailed.item_count(),
            subtotal: detailed.order.amount_cents,
            shipping: detailed.order.shipping_cents,
            total: detailed.order.total_cents(),
        })
        .collect();

    OrdersDetailSection { rows }
}

fn compose_product_breakdown(orders: &[DetailedOrder]) -> ProductBreakdownSection {
    let mut rows: Vec<ProductRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for detailed in orders {
        for item in &detailed.items {
            let key = item.product_key();
            match index.get(&key) {
                Some(&position) => {
                    rows[position].quantity += item.quantity;
                    rows[position].revenue += item.revenue_cents();
                }
                None => {
                    index.insert(key.clone(), rows.len());
                    rows.push(ProductRow {
                        name: key,
                        quantity: item.quantity,
                        revenue: item.revenue_cents(),
                    });
                }
            }
        }
    }

    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    ProductBreakdownSection { rows }
}

fn compose_customer_breakdown(orders: &[DetailedOrder]) -> CustomerBreakdownSection {
    let mut rows: Vec<CustomerRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for detailed in orders {
        let key = detailed.order.customer_key();
        match index.get(&key) {
            Some(&position) => {
                rows[position].order_count += 1;
                rows[position].total_spend += detailed.order.total_cents();
            }
            None => {
                index.insert(key.clone(), rows.len());
                rows.push(CustomerRow {
                    name: key,
                    phone: detailed.order.phone.clone().unwrap_or_default(),
                    order_count: 1,
                    total_spend: detailed.order.total_cents(),
                });
            }
        }
    }

    rows.sort_by(|a, b| b.total_spend.cmp(&a.total_spend));
    CustomerBreakdownSection { rows }
}
