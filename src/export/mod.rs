use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::ledger::ProjectionResult;

/// Write one row per income entry and expense occurrence of the month.
/// Returns the number of data rows written.
pub(crate) fn write_month_csv<W: Write>(writer: W, projection: &ProjectionResult) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["kind", "description", "amount", "status"])?;

    for entry in &projection.income {
        let amount = format!("{:.2}", entry.amount);
        wtr.write_record(["income", entry.description.as_str(), amount.as_str(), ""])?;
    }
    for occurrence in &projection.expenses {
        let kind = if occurrence.source.is_installment() {
            "installment"
        } else {
            "fixed"
        };
        let status = if occurrence.paid { "paid" } else { "pending" };
        let amount = format!("{:.2}", occurrence.amount);
        wtr.write_record([kind, occurrence.description.as_str(), amount.as_str(), status])?;
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(projection.income.len() + projection.expenses.len())
}

pub(crate) fn export_month(path: &Path, projection: &ProjectionResult) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let count = write_month_csv(file, projection)?;
    tracing::info!(path = %path.display(), month = %projection.month, rows = count, "month exported");
    Ok(count)
}

/// `~/fintrack-export-YYYY-MM.csv`
pub(crate) fn default_path(month: &crate::models::MonthKey) -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    format!("{home}/fintrack-export-{month}.csv")
}

#[cfg(test)]
mod tests;
