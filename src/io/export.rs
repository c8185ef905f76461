use anyhow::Result;
use std::io::Write;

use crate::application::ReportSections;
use crate::domain::format_bps;

/// Renderer turning composed report sections into flat file formats.
///
/// Money columns stay in integer minor units; percent columns are the only
/// values formatted here, at the renderer boundary.
pub struct Exporter<'a> {
    sections: &'a ReportSections,
}

impl<'a> Exporter<'a> {
    pub fn new(sections: &'a ReportSections) -> Self {
        Self { sections }
    }

    /// Write the full report as sectioned CSV: one titled block per
    /// section, blank-line separated. The spreadsheet-workbook analogue of
    /// one sheet per section.
    pub fn write_sections_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        let summary = &self.sections.summary;
        writeln!(writer, "# Summary — {}", summary.period_label)?;
        {
            let mut csv_writer = csv::Writer::from_writer(&mut writer);
            let generated = summary.generated_at.to_rfc3339();
            csv_writer.write_record(["metric", "value"])?;
            csv_writer.write_record(["Generated", generated.as_str()])?;
            for row in &summary.rows {
                csv_writer.write_record([row.label.as_str(), row.value.as_str()])?;
            }
            csv_writer.flush()?;
        }

        writeln!(writer)?;
        writeln!(writer, "# Trend")?;
        self.write_trend_csv(&mut writer)?;

        writeln!(writer)?;
        writeln!(writer, "# Orders")?;
        {
            let mut csv_writer = csv::Writer::from_writer(&mut writer);
            csv_writer.write_record([
                "customer", "phone", "status", "source", "items", "subtotal", "shipping", "total",
            ])?;
            for row in &self.sections.orders.rows {
                csv_writer.write_record([
                    row.customer.clone(),
                    row.phone.clone(),
                    row.status.clone(),
                    row.source.clone(),
                    row.item_count.to_string(),
                    row.subtotal.to_string(),
                    row.shipping.to_string(),
                    row.total.to_string(),
                ])?;
            }
            csv_writer.flush()?;
        }

        writeln!(writer)?;
        writeln!(writer, "# Products")?;
        {
            let mut csv_writer = csv::Writer::from_writer(&mut writer);
            csv_writer.write_record(["product", "quantity", "revenue"])?;
            for row in &self.sections.products.rows {
                csv_writer.write_record([
                    row.name.clone(),
                    row.quantity.to_string(),
                    row.revenue.to_string(),
                ])?;
            }
            csv_writer.flush()?;
        }

        writeln!(writer)?;
        writeln!(writer, "# Customers")?;
        {
            let mut csv_writer = csv::Writer::from_writer(&mut writer);
            csv_writer.write_record(["customer", "phone", "orders", "total_spend"])?;
            for row in &self.sections.customers.rows {
                csv_writer.write_record([
                    row.name.clone(),
                    row.phone.clone(),
                    row.order_count.to_string(),
                    row.total_spend.to_string(),
                ])?;
            }
            csv_writer.flush()?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write the trend section alone as a flat table: header row, one row
    /// per point, then the TOTAL row.
    pub fn write_trend_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["period", "revenue", "expenses", "net_profit", "margin"])?;

        let trend = &self.sections.trend;
        for row in trend.rows.iter().chain(std::iter::once(&trend.total)) {
            csv_writer.write_record([
                row.label.clone(),
                row.revenue.to_string(),
                row.expenses.to_string(),
                row.net_profit.to_string(),
                format_bps(row.margin),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<()> {
        let json = serde_json::to_string_pretty(self.sections)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}
