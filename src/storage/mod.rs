mod repository;

pub use repository::*;

/// SQL migration for the initial schema
pub const MIGRATION_001_INITIAL: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id TEXT PRIMARY KEY,
    amount_cents INTEGER NOT NULL,
    shipping_cents INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL,
    source TEXT,
    customer_name TEXT,
    phone TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_orders_created_at ON orders(created_at);
CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);

CREATE TABLE IF NOT EXISTS expenses (
    id TEXT PRIMARY KEY,
    amount_cents INTEGER NOT NULL,
    category TEXT,
    incurred_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_expenses_incurred_at ON expenses(incurred_at);

CREATE TABLE IF NOT EXISTS order_items (
    id TEXT PRIMARY KEY,
    order_id TEXT NOT NULL REFERENCES orders(id),
    product_name TEXT NOT NULL,
    variant_title TEXT,
    quantity INTEGER NOT NULL,
    unit_price_cents INTEGER NOT NULL,
    unit_cost_cents INTEGER
);
CREATE INDEX IF NOT EXISTS idx_order_items_order_id ON order_items(order_id);
"#;
