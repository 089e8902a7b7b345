use std::fs::File;
use std::path::Path;

use rusqlite::Connection;
use tracing::info;

use super::add::{build_transaction, TransactionInput};
use super::export::CSV_HEADER;
use crate::db::repository;
use crate::errors::{AppError, Result};
use crate::models::transaction::Transaction;

/// Loads transactions from a CSV file and appends them to the ledger.
///
/// The whole file is parsed and validated before anything is written, and
/// the inserts run inside one SQL transaction, so a failed import leaves
/// the database untouched. Returns the number of rows added.
pub fn import_csv_file(conn: &Connection, path: &Path) -> Result<usize> {
    let transactions = read_csv(path)?;
    let db_tx = conn.unchecked_transaction()?;
    for transaction in &transactions {
        repository::add_transaction(&db_tx, transaction)?;
    }
    db_tx.commit()?;
    info!(count = transactions.len(), path = %path.display(), "imported transactions");
    Ok(transactions.len())
}

fn read_csv(path: &Path) -> Result<Vec<Transaction>> {
    let file = File::open(path).map_err(|source| AppError::FileOpen {
        path: path.display().to_string(),
        source,
    })?;

    // flexible() so short rows reach our own column-count check instead of
    // surfacing as a generic csv error.
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    check_header(reader.headers()?)?;

    let mut transactions = Vec::new();
    for (index, result) in reader.records().enumerate() {
        // Line 1 is the header row.
        let line = index + 2;
        let record = result.map_err(|e| AppError::from(e).at_line(line))?;

        if record.len() != CSV_HEADER.len() {
            return Err(AppError::CsvColumnCount {
                line,
                count: record.len(),
            });
        }

        let input = TransactionInput {
            date: record.get(0).unwrap_or("").to_string(),
            category: record.get(1).unwrap_or("").to_string(),
            kind: record.get(2).unwrap_or("").to_string(),
            amount: record.get(3).unwrap_or("").to_string(),
            description: record.get(4).unwrap_or("").to_string(),
        };
        let transaction = build_transaction(&input).map_err(|e| e.at_line(line))?;
        transactions.push(transaction);
    }

    Ok(transactions)
}

fn check_header(headers: &csv::StringRecord) -> Result<()> {
    let matches = headers.len() == CSV_HEADER.len()
        && headers
            .iter()
            .zip(CSV_HEADER)
            .all(|(found, expected)| found.trim().eq_ignore_ascii_case(expected));
    if matches {
        Ok(())
    } else {
        Err(AppError::CsvHeaderMismatch {
            found: headers.iter().collect::<Vec<_>>().join(","),
        })
    }
}
