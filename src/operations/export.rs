use std::fs::File;
use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use crate::db::repository;
use crate::errors::{AppError, Result};

/// Column order of the CSV interchange format shared by import and export.
pub const CSV_HEADER: [&str; 5] = ["date", "category", "type", "amount", "description"];

/// Writes the full ledger to `path` in insertion order and returns the number
/// of rows written. Transaction ids stay internal to the database.
pub fn export_csv_file(conn: &Connection, path: &Path) -> Result<usize> {
    let transactions = repository::get_all_transactions(conn)?;

    let file = File::create(path).map_err(|source| AppError::FileOpen {
        path: path.display().to_string(),
        source,
    })?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(CSV_HEADER)?;
    for transaction in &transactions {
        writer.write_record([
            transaction.date.format("%Y-%m-%d").to_string(),
            transaction.category.clone(),
            transaction.kind.as_str().to_string(),
            transaction.amount.to_string(),
            transaction.description.clone(),
        ])?;
    }
    writer.flush()?;

    info!(count = transactions.len(), path = %path.display(), "exported ledger");
    Ok(transactions.len())
}
