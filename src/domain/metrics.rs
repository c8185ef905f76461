use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::money::{div_round, percent_change_bps, BasisPoints, Cents};
use super::records::{ExpenseRecord, OrderItemRecord, OrderRecord};

/// Period-scoped financial metrics, computed fresh per request and never
/// mutated after construction.
///
/// `cogs` (and therefore `gross_profit`) is `None` when no line item in
/// scope carries a unit cost: unknown cost data propagates as null instead
/// of masquerading as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub revenue: Cents,
    pub cogs: Option<Cents>,
    pub gross_profit: Option<Cents>,
    pub expenses: Cents,
    pub net_profit: Cents,
    pub order_count: i64,
    /// Average order value, rounded to the nearest cent
    pub aov: Cents,
}

impl FinancialMetrics {
    /// Reduce raw period-scoped rows into metrics. Total over any
    /// structurally valid input: empty arrays produce all-zero metrics.
    ///
    /// Revenue counts the full billed amount (base + shipping) of
    /// revenue-eligible orders. Shipping is then also booked as an expense,
    /// so gross revenue reports what was billed while net profit treats
    /// shipping as a pass-through cost.
    pub fn aggregate(
        orders: &[OrderRecord],
        expenses: &[ExpenseRecord],
        items: &[OrderItemRecord],
    ) -> Self {
        let eligible: Vec<&OrderRecord> = orders
            .iter()
            .filter(|order| order.status.is_revenue_eligible())
            .collect();
        let eligible_ids: HashSet<_> = eligible.iter().map(|order| order.id).collect();

        let revenue: Cents = eligible.iter().map(|order| order.total_cents()).sum();
        let shipping_expense: Cents = eligible.iter().map(|order| order.shipping_cents).sum();
        let explicit_expenses: Cents = expenses.iter().map(|expense| expense.amount_cents).sum();
        let total_expenses = explicit_expenses + shipping_expense;

        // Items without a unit cost are excluded from the sum, not treated
        // as zero-cost. COGS stays null until at least one costed item exists.
        let mut cogs: Option<Cents> = None;
        for item in items {
            if !eligible_ids.contains(&item.order_id) {
                continue;
            }
            if let Some(unit_cost) = item.unit_cost_cents {
                *cogs.get_or_insert(0) += item.quantity * unit_cost;
            }
        }

        let gross_profit = cogs.map(|c| revenue - c);
        let net_profit = match gross_profit {
            Some(gross) => gross - total_expenses,
            None => revenue - total_expenses,
        };

        let order_count = eligible.len() as i64;

        Self {
            revenue,
            cogs,
            gross_profit,
            expenses: total_expenses,
            net_profit,
            order_count,
            aov: div_round(revenue, order_count),
        }
    }
}

/// Basis-point deltas between two metrics values, field by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricChanges {
    pub revenue: BasisPoints,
    pub expenses: BasisPoints,
    pub net_profit: BasisPoints,
    pub order_count: BasisPoints,
    pub aov: BasisPoints,
}

/// Two periods' metrics with percentage deltas. Pure value combination;
/// the caller decides whether comparing the two intervals is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialComparison {
    pub current: FinancialMetrics,
    pub previous: FinancialMetrics,
    pub changes: MetricChanges,
}

impl FinancialComparison {
    pub fn compare(current: FinancialMetrics, previous: FinancialMetrics) -> Self {
        let changes = MetricChanges {
            revenue: percent_change_bps(current.revenue, previous.revenue),
            expenses: percent_change_bps(current.expenses, previous.expenses),
            net_profit: percent_change_bps(current.net_profit, previous.net_profit),
            order_count: percent_change_bps(current.order_count, previous.order_count),
            aov: percent_change_bps(current.aov, previous.aov),
        };
        Self {
            current,
            previous,
            changes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::OrderStatus;
    use chrono::Utc;

    fn order(amount: Cents, shipping: Cents, status: OrderStatus) -> OrderRecord {
        OrderRecord::new(amount, status, Utc::now()).with_shipping(shipping)
    }

    fn expense(amount: Cents) -> ExpenseRecord {
        ExpenseRecord::new(amount, Utc::now())
    }

    #[test]
    fn test_aggregate_empty_input() {
        let metrics = FinancialMetrics::aggregate(&[], &[], &[]);
        assert_eq!(metrics.revenue, 0);
        assert_eq!(metrics.cogs, None);
        assert_eq!(metrics.gross_profit, None);
        assert_eq!(metrics.expenses, 0);
        assert_eq!(metrics.net_profit, 0);
        assert_eq!(metrics.order_count, 0);
        assert_eq!(metrics.aov, 0);
    }

    #[test]
    fn test_aggregate_shipping_double_entry() {
        // Pending order is excluded; shipping appears in revenue and again
        // as an expense.
        let orders = vec![
            order(10_000, 500, OrderStatus::Paid),
            order(5_000, 0, OrderStatus::Pending),
        ];
        let expenses = vec![expense(1_000)];

        let metrics = FinancialMetrics::aggregate(&orders, &expenses, &[]);
        assert_eq!(metrics.revenue, 10_500);
        assert_eq!(metrics.cogs, None);
        assert_eq!(metrics.gross_profit, None);
        assert_eq!(metrics.expenses, 1_500);
        assert_eq!(metrics.net_profit, 9_000);
        assert_eq!(metrics.order_count, 1);
        assert_eq!(metrics.aov, 10_500);
    }

    #[test]
    fn test_cogs_skips_uncosted_items() {
        let paid = order(10_000, 0, OrderStatus::Paid);
        let items = vec![
            OrderItemRecord::new(paid.id, "Jacket", 2, 4_000).with_unit_cost(300),
            OrderItemRecord::new(paid.id, "Scarf", 1, 2_000),
        ];

        let metrics = FinancialMetrics::aggregate(std::slice::from_ref(&paid), &[], &items);
        // Second item has no cost data and is excluded, not counted as 0
        assert_eq!(metrics.cogs, Some(600));
        assert_eq!(metrics.gross_profit, Some(9_400));
        assert_eq!(metrics.net_profit, 9_400);
    }

    #[test]
    fn test_cogs_ignores_items_of_ineligible_orders() {
        let cancelled = order(10_000, 0, OrderStatus::Cancelled);
        let items = vec![OrderItemRecord::new(cancelled.id, "Jacket", 1, 4_000).with_unit_cost(900)];

        let metrics = FinancialMetrics::aggregate(std::slice::from_ref(&cancelled), &[], &items);
        assert_eq!(metrics.revenue, 0);
        assert_eq!(metrics.cogs, None);
    }

    #[test]
    fn test_aggregate_permutation_invariant() {
        let orders = vec![
            order(10_000, 500, OrderStatus::Paid),
            order(7_000, 0, OrderStatus::Shipped),
            order(3_000, 200, OrderStatus::Completed),
        ];
        let expenses = vec![expense(1_000), expense(2_500)];
        let items = vec![
            OrderItemRecord::new(orders[0].id, "Coat", 1, 9_000).with_unit_cost(2_000),
            OrderItemRecord::new(orders[1].id, "Shirt", 2, 3_500).with_unit_cost(800),
        ];

        let forward = FinancialMetrics::aggregate(&orders, &expenses, &items);

        let mut orders_rev = orders.clone();
        orders_rev.reverse();
        let mut expenses_rev = expenses.clone();
        expenses_rev.reverse();
        let mut items_rev = items.clone();
        items_rev.reverse();

        let reversed = FinancialMetrics::aggregate(&orders_rev, &expenses_rev, &items_rev);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_aov_rounding_bound() {
        let orders = vec![
            order(3_333, 0, OrderStatus::Paid),
            order(3_333, 0, OrderStatus::Paid),
            order(3_335, 0, OrderStatus::Paid),
        ];
        let metrics = FinancialMetrics::aggregate(&orders, &[], &[]);
        assert_eq!(metrics.aov, 3_334); // 10001 / 3 rounded
        assert!((metrics.aov * metrics.order_count - metrics.revenue).abs() < metrics.order_count);
    }

    #[test]
    fn test_net_profit_invariants() {
        let paid = order(20_000, 0, OrderStatus::Paid);
        let expenses = vec![expense(4_000)];

        // cogs null: net = revenue - expenses
        let without_costs = FinancialMetrics::aggregate(std::slice::from_ref(&paid), &expenses, &[]);
        assert_eq!(without_costs.net_profit, without_costs.revenue - without_costs.expenses);

        // cogs present: net = gross - expenses
        let items = vec![OrderItemRecord::new(paid.id, "Dress", 1, 20_000).with_unit_cost(6_000)];
        let with_costs = FinancialMetrics::aggregate(std::slice::from_ref(&paid), &expenses, &items);
        assert_eq!(
            with_costs.net_profit,
            with_costs.gross_profit.unwrap() - with_costs.expenses
        );
    }

    #[test]
    fn test_compare_zero_baseline() {
        let current = FinancialMetrics::aggregate(
            &[order(5_000, 0, OrderStatus::Paid)],
            &[],
            &[],
        );
        let previous = FinancialMetrics::aggregate(&[], &[], &[]);

        let comparison = FinancialComparison::compare(current, previous);
        assert_eq!(comparison.changes.revenue, 10_000);
        assert_eq!(comparison.changes.expenses, 0);
        assert_eq!(comparison.changes.order_count, 10_000);
    }

    #[test]
    fn test_compare_deltas() {
        let current = FinancialMetrics::aggregate(
            &[order(15_000, 0, OrderStatus::Paid)],
            &[expense(3_000)],
            &[],
        );
        let previous = FinancialMetrics::aggregate(
            &[order(10_000, 0, OrderStatus::Paid)],
            &[expense(2_000)],
            &[],
        );

        let comparison = FinancialComparison::compare(current, previous);
        assert_eq!(comparison.changes.revenue, 5_000); // +50%
        assert_eq!(comparison.changes.expenses, 5_000);
        assert_eq!(comparison.changes.order_count, 0);
    }
}
