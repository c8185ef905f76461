use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type OrderId = Uuid;
pub type ExpenseId = Uuid;
pub type OrderItemId = Uuid;

/// Bucket key for records missing an expense category.
pub const OTHER_BUCKET: &str = "Other";
/// Bucket key for orders missing a customer or source.
pub const UNKNOWN_BUCKET: &str = "Unknown";

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Draft,
    Pending,
    Paid,
    Completed,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Completed => "completed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(OrderStatus::Draft),
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "completed" => Some(OrderStatus::Completed),
            "shipped" => Some(OrderStatus::Shipped),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Only orders in these states count toward revenue and profit metrics.
    pub fn is_revenue_eligible(&self) -> bool {
        matches!(
            self,
            OrderStatus::Paid | OrderStatus::Completed | OrderStatus::Shipped
        )
    }

    /// The status allow-list applied to revenue-bearing queries.
    pub fn revenue_eligible() -> &'static [OrderStatus] {
        &[OrderStatus::Paid, OrderStatus::Completed, OrderStatus::Shipped]
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A customer order. `amount_cents` is the base (merchandise) amount;
/// shipping is billed on top of it and tracked separately because it enters
/// both the revenue and the expense side of the metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    /// Base amount in cents, excluding shipping
    pub amount_cents: Cents,
    /// Shipping billed to the customer, in cents
    pub shipping_cents: Cents,
    pub status: OrderStatus,
    /// Sales channel (e.g., "instagram", "walk-in")
    pub source: Option<String>,
    /// Customer display name
    pub customer_name: Option<String>,
    /// Customer contact phone
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn new(amount_cents: Cents, status: OrderStatus, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount_cents,
            shipping_cents: 0,
            status,
            source: None,
            customer_name: None,
            phone: None,
            created_at,
        }
    }

    pub fn with_shipping(mut self, shipping_cents: Cents) -> Self {
        self.shipping_cents = shipping_cents;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_customer(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Base amount plus shipping: the full billed amount.
    pub fn total_cents(&self) -> Cents {
        self.amount_cents + self.shipping_cents
    }

    /// Grouping key for revenue-by-source breakdowns.
    pub fn source_key(&self) -> String {
        self.source.clone().unwrap_or_else(|| OTHER_BUCKET.to_string())
    }

    /// Grouping key for customer breakdowns.
    pub fn customer_key(&self) -> String {
        self.customer_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_BUCKET.to_string())
    }
}

/// An explicit expense entry (fabric, rent, tailor payouts, marketing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub amount_cents: Cents,
    pub category: Option<String>,
    pub incurred_at: DateTime<Utc>,
}

impl ExpenseRecord {
    pub fn new(amount_cents: Cents, incurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount_cents,
            category: None,
            incurred_at,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Grouping key for expense-by-category breakdowns.
    pub fn category_key(&self) -> String {
        self.category.clone().unwrap_or_else(|| OTHER_BUCKET.to_string())
    }
}

/// A line item on an order. The unit cost is unknown for items whose
/// materials were never costed; such items are excluded from COGS rather
/// than counted as free.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRecord {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_name: String,
    pub variant_title: Option<String>,
    pub quantity: i64,
    pub unit_price_cents: Cents,
    pub unit_cost_cents: Option<Cents>,
}

impl OrderItemRecord {
    pub fn new(
        order_id: OrderId,
        product_name: impl Into<String>,
        quantity: i64,
        unit_price_cents: Cents,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            product_name: product_name.into(),
            variant_title: None,
            quantity,
            unit_price_cents,
            unit_cost_cents: None,
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant_title = Some(variant.into());
        self
    }

    pub fn with_unit_cost(mut self, unit_cost_cents: Cents) -> Self {
        self.unit_cost_cents = Some(unit_cost_cents);
        self
    }

    /// Grouping key for product breakdowns: name plus variant when present.
    pub fn product_key(&self) -> String {
        match &self.variant_title {
            Some(variant) => format!("{} / {}", self.product_name, variant),
            None => self.product_name.clone(),
        }
    }

    /// Item revenue at list price.
    pub fn revenue_cents(&self) -> Cents {
        self.quantity * self.unit_price_cents
    }
}

/// An order together with its line items, as fetched for the detail and
/// breakdown sections of a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedOrder {
    pub order: OrderRecord,
    pub items: Vec<OrderItemRecord>,
}

impl DetailedOrder {
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            OrderStatus::Draft,
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Completed,
            OrderStatus::Shipped,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_revenue_eligibility() {
        assert!(OrderStatus::Paid.is_revenue_eligible());
        assert!(OrderStatus::Completed.is_revenue_eligible());
        assert!(OrderStatus::Shipped.is_revenue_eligible());
        assert!(!OrderStatus::Pending.is_revenue_eligible());
        assert!(!OrderStatus::Cancelled.is_revenue_eligible());
        assert!(!OrderStatus::Draft.is_revenue_eligible());
    }

    #[test]
    fn test_bucket_keys() {
        let order = OrderRecord::new(10_000, OrderStatus::Paid, Utc::now());
        assert_eq!(order.source_key(), "Other");
        assert_eq!(order.customer_key(), "Unknown");

        let order = order.with_source("instagram").with_customer("Ada");
        assert_eq!(order.source_key(), "instagram");
        assert_eq!(order.customer_key(), "Ada");

        let expense = ExpenseRecord::new(500, Utc::now());
        assert_eq!(expense.category_key(), "Other");
    }

    #[test]
    fn test_product_key_includes_variant() {
        let order_id = Uuid::new_v4();
        let plain = OrderItemRecord::new(order_id, "Linen Shirt", 1, 8000);
        assert_eq!(plain.product_key(), "Linen Shirt");

        let sized = plain.clone().with_variant("Size M");
        assert_eq!(sized.product_key(), "Linen Shirt / Size M");
        assert_eq!(sized.revenue_cents(), 8000);
    }
}
