use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::{ReportSections, ReportService};
use crate::domain::{
    format_bps, format_cents, parse_cents, OrderStatus, Period, PeriodKind,
};
use crate::io::Exporter;

/// Sartoria - financial metrics and reporting for a made-to-order workshop
#[derive(Parser)]
#[command(name = "sartoria")]
#[command(about = "Financial metrics and reporting engine for a made-to-order tailoring shop")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "sartoria.db")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Order entry commands
    #[command(subcommand)]
    Order(OrderCommands),

    /// Record an expense
    Expense {
        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Expense category (e.g., "fabric", "rent", "marketing")
        #[arg(short, long)]
        category: Option<String>,

        /// Date incurred (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show financial metrics for a period
    Metrics {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Compare a period against the previous one
    Compare {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show the trend series for a period
    Series {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Generate the full multi-section report
    Report {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,

        /// Condensed top-5 variant of the ranked sections
        #[arg(long)]
        top5: bool,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// Record a new order
    Add {
        /// Base amount excluding shipping (e.g., "120.00")
        amount: String,

        /// Shipping billed to the customer
        #[arg(long, default_value = "0")]
        shipping: String,

        /// Status: draft, pending, paid, completed, shipped, cancelled
        #[arg(short, long, default_value = "paid")]
        status: String,

        /// Sales channel (e.g., "instagram", "walk-in")
        #[arg(long)]
        source: Option<String>,

        /// Customer display name
        #[arg(long)]
        customer: Option<String>,

        /// Customer phone
        #[arg(long)]
        phone: Option<String>,

        /// Order date (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// Add a line item to an existing order
    Item {
        /// Order ID
        order_id: String,

        /// Product name
        product: String,

        /// Variant title (e.g., "Size M")
        #[arg(long)]
        variant: Option<String>,

        /// Quantity
        #[arg(short, long, default_value = "1")]
        quantity: i64,

        /// Unit price (e.g., "80.00")
        #[arg(long)]
        price: String,

        /// Unit cost, if known
        #[arg(long)]
        cost: Option<String>,
    },
}

/// Period selection shared by the reporting commands. Without --year the
/// period containing today is used.
#[derive(clap::Args)]
pub struct PeriodArgs {
    /// Period kind: month, quarter, year
    #[arg(short, long, default_value = "month")]
    pub kind: String,

    /// Year (defaults to the current period)
    #[arg(long)]
    pub year: Option<i32>,

    /// Month index 1-12 (for --kind month)
    #[arg(long)]
    pub month: Option<u32>,

    /// Quarter index 1-4 (for --kind quarter)
    #[arg(long)]
    pub quarter: Option<u32>,
}

impl PeriodArgs {
    fn resolve(&self) -> Result<Period> {
        let kind = PeriodKind::from_str(&self.kind).with_context(|| {
            format!("Invalid period kind '{}'. Valid: month, quarter, year", self.kind)
        })?;
        match self.year {
            Some(year) => Ok(Period::from_query(kind, year, self.month, self.quarter)?),
            None => Ok(Period::resolve(kind, Utc::now())),
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                ReportService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Order(order_cmd) => {
                let service = ReportService::connect(&self.database).await?;
                run_order_command(&service, order_cmd).await?;
            }

            Commands::Expense {
                amount,
                category,
                date,
            } => {
                let service = ReportService::connect(&self.database).await?;
                let amount_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;
                let incurred_at = parse_date_or_now(date.as_deref())?;

                let expense = service
                    .record_expense(amount_cents, category, incurred_at)
                    .await?;
                println!(
                    "Recorded expense: {} [{}] ({})",
                    format_cents(expense.amount_cents),
                    expense.category_key(),
                    expense.id
                );
            }

            Commands::Metrics { period, format } => {
                let service = ReportService::connect(&self.database).await?;
                let period = period.resolve()?;
                let metrics = service.metrics_for(&period).await?;

                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&metrics)?),
                    _ => {
                        println!("Financial Metrics — {}", period.label);
                        println!();
                        println!("Revenue:        {:>15}", format_cents(metrics.revenue));
                        println!("COGS:           {:>15}", optional_cents(metrics.cogs));
                        println!(
                            "Gross Profit:   {:>15}",
                            optional_cents(metrics.gross_profit)
                        );
                        println!("Expenses:       {:>15}", format_cents(metrics.expenses));
                        println!("{}", "-".repeat(32));
                        println!("Net Profit:     {:>15}", format_cents(metrics.net_profit));
                        println!("Orders:         {:>15}", metrics.order_count);
                        println!("Avg Order:      {:>15}", format_cents(metrics.aov));
                    }
                }
            }

            Commands::Compare { period, format } => {
                let service = ReportService::connect(&self.database).await?;
                let period = period.resolve()?;
                let comparison = service.compare_with_previous(&period).await?;

                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&comparison)?),
                    _ => {
                        println!("Period Comparison — {} vs previous", period.label);
                        println!();
                        println!(
                            "{:<14} {:>14} {:>14} {:>9}",
                            "METRIC", "CURRENT", "PREVIOUS", "CHANGE"
                        );
                        println!("{}", "-".repeat(55));
                        let rows = [
                            (
                                "Revenue",
                                format_cents(comparison.current.revenue),
                                format_cents(comparison.previous.revenue),
                                comparison.changes.revenue,
                            ),
                            (
                                "Expenses",
                                format_cents(comparison.current.expenses),
                                format_cents(comparison.previous.expenses),
                                comparison.changes.expenses,
                            ),
                            (
                                "Net Profit",
                                format_cents(comparison.current.net_profit),
                                format_cents(comparison.previous.net_profit),
                                comparison.changes.net_profit,
                            ),
                            (
                                "Orders",
                                comparison.current.order_count.to_string(),
                                comparison.previous.order_count.to_string(),
                                comparison.changes.order_count,
                            ),
                            (
                                "Avg Order",
                                format_cents(comparison.current.aov),
                                format_cents(comparison.previous.aov),
                                comparison.changes.aov,
                            ),
                        ];
                        for (label, current, previous, change) in rows {
                            println!(
                                "{:<14} {:>14} {:>14} {:>9}",
                                label,
                                current,
                                previous,
                                format_bps(change)
                            );
                        }
                    }
                }
            }

            Commands::Series { period, format } => {
                let service = ReportService::connect(&self.database).await?;
                let period = period.resolve()?;
                let series = service.time_series(&period).await?;

                match format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&series)?),
                    "csv" => {
                        println!("period,revenue,expenses,net_profit");
                        for point in &series {
                            println!(
                                "{},{},{},{}",
                                point.label, point.revenue, point.expenses, point.net_profit
                            );
                        }
                    }
                    _ => {
                        println!("Trend — {}", period.label);
                        println!();
                        println!(
                            "{:<14} {:>12} {:>12} {:>12}",
                            "PERIOD", "REVENUE", "EXPENSES", "NET"
                        );
                        println!("{}", "-".repeat(53));
                        for point in &series {
                            println!(
                                "{:<14} {:>12} {:>12} {:>12}",
                                point.label,
                                format_cents(point.revenue),
                                format_cents(point.expenses),
                                format_cents(point.net_profit)
                            );
                        }
                    }
                }
            }

            Commands::Report {
                period,
                format,
                top5,
                output,
            } => {
                let service = ReportService::connect(&self.database).await?;
                let period = period.resolve()?;
                let sections = service.compose_report(&period, Utc::now()).await?;
                let sections = if top5 { sections.condensed(5) } else { sections };

                run_report_output(&sections, &format, output.as_deref())?;
            }
        }

        Ok(())
    }
}

async fn run_order_command(service: &ReportService, cmd: OrderCommands) -> Result<()> {
    match cmd {
        OrderCommands::Add {
            amount,
            shipping,
            status,
            source,
            customer,
            phone,
            date,
        } => {
            let amount_cents =
                parse_cents(&amount).context("Invalid amount format. Use '120.00' or '120'")?;
            let shipping_cents = parse_cents(&shipping).context("Invalid shipping format")?;
            let status = OrderStatus::from_str(&status).with_context(|| {
                format!(
                    "Invalid status '{}'. Valid: draft, pending, paid, completed, shipped, cancelled",
                    status
                )
            })?;
            let created_at = parse_date_or_now(date.as_deref())?;

            let order = service
                .record_order(
                    amount_cents,
                    shipping_cents,
                    status,
                    source,
                    customer,
                    phone,
                    created_at,
                )
                .await?;
            println!(
                "Recorded order: {} + {} shipping, {} ({})",
                format_cents(order.amount_cents),
                format_cents(order.shipping_cents),
                order.status,
                order.id
            );
        }

        OrderCommands::Item {
            order_id,
            product,
            variant,
            quantity,
            price,
            cost,
        } => {
            let order_id =
                Uuid::parse_str(&order_id).context("Invalid order ID format (expected UUID)")?;
            let unit_price = parse_cents(&price).context("Invalid price format")?;
            let unit_cost = cost
                .map(|c| parse_cents(&c))
                .transpose()
                .context("Invalid cost format")?;

            let item = service
                .record_order_item(order_id, product, variant, quantity, unit_price, unit_cost)
                .await?;
            println!(
                "Added item: {} x{} @ {} ({})",
                item.product_key(),
                item.quantity,
                format_cents(item.unit_price_cents),
                item.id
            );
        }
    }
    Ok(())
}

fn run_report_output(sections: &ReportSections, format: &str, output: Option<&str>) -> Result<()> {
    use std::fs::File;
    use std::io::{stdout, Write};

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let exporter = Exporter::new(sections);
    match format {
        "json" => exporter.write_json(writer)?,
        "csv" => exporter.write_sections_csv(writer)?,
        _ => print_report_table(sections),
    }

    if output.is_some() {
        eprintln!("Report written ({} format)", format);
    }
    Ok(())
}

fn print_report_table(sections: &ReportSections) {
    let summary = &sections.summary;
    println!("Report — {}", summary.period_label);
    println!("Generated: {}", summary.generated_at.format("%Y-%m-%d %H:%M"));
    println!();
    for row in &summary.rows {
        println!("{:<20} {:>15}", row.label, row.value);
    }

    println!();
    println!("Trend");
    println!(
        "{:<14} {:>12} {:>12} {:>12} {:>8}",
        "PERIOD", "REVENUE", "EXPENSES", "NET", "MARGIN"
    );
    println!("{}", "-".repeat(62));
    let trend = &sections.trend;
    for row in trend.rows.iter().chain(std::iter::once(&trend.total)) {
        println!(
            "{:<14} {:>12} {:>12} {:>12} {:>8}",
            row.label,
            format_cents(row.revenue),
            format_cents(row.expenses),
            format_cents(row.net_profit),
            format_bps(row.margin)
        );
    }

    if !sections.products.rows.is_empty() {
        println!();
        println!("Top Products");
        for (i, row) in sections.products.rows.iter().enumerate() {
            println!(
                "  {}. {:<28} x{:<5} {:>12}",
                i + 1,
                truncate(&row.name, 28),
                row.quantity,
                format_cents(row.revenue)
            );
        }
    }

    if !sections.customers.rows.is_empty() {
        println!();
        println!("Top Customers");
        for (i, row) in sections.customers.rows.iter().enumerate() {
            println!(
                "  {}. {:<28} {:>3} orders {:>12}",
                i + 1,
                truncate(&row.name, 28),
                row.order_count,
                format_cents(row.total_spend)
            );
        }
    }

    if !sections.orders.rows.is_empty() {
        println!();
        println!("Orders");
        println!(
            "{:<20} {:<12} {:<12} {:>6} {:>12} {:>10} {:>12}",
            "CUSTOMER", "STATUS", "SOURCE", "ITEMS", "SUBTOTAL", "SHIPPING", "TOTAL"
        );
        println!("{}", "-".repeat(90));
        for row in &sections.orders.rows {
            println!(
                "{:<20} {:<12} {:<12} {:>6} {:>12} {:>10} {:>12}",
                truncate(&row.customer, 20),
                row.status,
                truncate(&row.source, 12),
                row.item_count,
                format_cents(row.subtotal),
                format_cents(row.shipping),
                format_cents(row.total)
            );
        }
    }
}

fn optional_cents(value: Option<i64>) -> String {
    match value {
        Some(cents) => format_cents(cents),
        None => "n/a".to_string(),
    }
}

fn parse_date_or_now(date: Option<&str>) -> Result<DateTime<Utc>> {
    match date {
        Some(date_str) => {
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str))?;
            Ok(date.and_hms_opt(0, 0, 0).unwrap().and_utc())
        }
        None => Ok(Utc::now()),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
