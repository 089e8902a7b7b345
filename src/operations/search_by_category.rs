use rusqlite::Connection;

use crate::db::repository;
use crate::errors::{AppError, Result};
use crate::models::transaction::Transaction;

/// Case-insensitive category lookup, in log order.
pub fn search_transactions_by_category(
    conn: &Connection,
    category: &str,
) -> Result<Vec<Transaction>> {
    let category = category.trim();
    if category.is_empty() {
        return Err(AppError::EmptyCategory);
    }
    repository::search_by_category(conn, category)
}
