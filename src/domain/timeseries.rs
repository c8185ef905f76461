use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics::FinancialMetrics;
use super::money::Cents;
use super::period::Period;

/// One chart-ready point of a trend series: the metrics of a single
/// sub-period, in sub-period generation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub label: String,
    pub date: DateTime<Utc>,
    pub revenue: Cents,
    pub expenses: Cents,
    pub gross_profit: Option<Cents>,
    pub net_profit: Cents,
}

impl TimeSeriesPoint {
    pub fn from_metrics(period: &Period, metrics: &FinancialMetrics) -> Self {
        Self {
            label: period.label.clone(),
            date: period.start,
            revenue: metrics.revenue,
            expenses: metrics.expenses,
            gross_profit: metrics.gross_profit,
            net_profit: metrics.net_profit,
        }
    }
}
