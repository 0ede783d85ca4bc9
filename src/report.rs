use std::path::Path;

use anyhow::{Context, Result};

use crate::{aggregate::SaleBucket, io_utils};

/// Fixed output schema. Every summary row has all seven columns populated;
/// date and type may be null only when the store had no such dimension.
pub const REPORT_COLUMNS: [&str; 7] = [
    "store_id",
    "store_name",
    "date",
    "type",
    "sale_amount",
    "sale_count",
    "currency",
];

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub store_id: String,
    pub store_name: String,
    pub date: Option<String>,
    pub kind: Option<String>,
    pub sale_amount: f64,
    pub sale_count: u64,
    pub currency: String,
}

impl SummaryRow {
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.store_id.clone(),
            self.store_name.clone(),
            self.date.clone().unwrap_or_default(),
            self.kind.clone().unwrap_or_default(),
            format_amount(self.sale_amount),
            self.sale_count.to_string(),
            self.currency.clone(),
        ]
    }
}

/// Attaches store identity and currency to every aggregate bucket. A store
/// with zero buckets contributes zero rows, never a row of zeros.
pub fn build_rows(
    store_id: &str,
    store_name: &str,
    currency: &str,
    buckets: Vec<SaleBucket>,
) -> Vec<SummaryRow> {
    buckets
        .into_iter()
        .map(|bucket| SummaryRow {
            store_id: store_id.to_string(),
            store_name: store_name.to_string(),
            date: bucket.date,
            kind: bucket.kind,
            sale_amount: bucket.amount,
            sale_count: bucket.count,
            currency: currency.to_string(),
        })
        .collect()
}

/// Post-aggregation period filter: with a year (and optionally a month)
/// selector, only rows whose date string starts with the selector prefix
/// survive. Rows without a date never match an active selector.
pub fn matches_period(row: &SummaryRow, year: Option<i32>, month: Option<u32>) -> bool {
    let Some(year) = year else {
        return true;
    };
    let prefix = match month {
        Some(month) => format!("{year:04}-{month:02}"),
        None => format!("{year:04}"),
    };
    row.date.as_deref().is_some_and(|d| d.starts_with(&prefix))
}

pub fn write_report(rows: &[SummaryRow], output: Option<&Path>) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(output, io_utils::DEFAULT_CSV_DELIMITER)?;
    writer
        .write_record(REPORT_COLUMNS)
        .context("Writing report header")?;
    for row in rows {
        writer
            .write_record(row.to_record())
            .context("Writing report row")?;
    }
    writer.flush().context("Flushing report output")?;
    Ok(())
}

fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
