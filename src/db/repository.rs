use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use crate::errors::{AppError, Result};
use crate::models::transaction::{Transaction, TransactionKind};

const SELECT_COLUMNS: &str = "id, date, category, kind, amount, description";

pub fn add_transaction(conn: &Connection, transaction: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions (id, date, category, kind, amount, description) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            &transaction.id,
            transaction.date.to_string(),
            &transaction.category,
            transaction.kind.as_str(),
            transaction.amount.to_string(),
            &transaction.description,
        ],
    )?;
    debug!(id = %transaction.id, "inserted transaction");
    Ok(())
}

/// Returns the full ledger in insertion order, which is the log order the
/// rest of the app (list, summary, export) works with.
pub fn get_all_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SELECT_COLUMNS} FROM transactions ORDER BY rowid ASC"
    ))?;
    let rows = stmt.query_map([], map_row)?;

    let mut transactions = Vec::new();
    for row in rows {
        transactions.push(row?);
    }
    Ok(transactions)
}

pub fn remove_transaction(conn: &Connection, id: &str) -> Result<()> {
    let rows_affected = conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
    if rows_affected == 0 {
        return Err(AppError::TransactionNotFound(id.to_string()));
    }
    debug!(id, "removed transaction");
    Ok(())
}

pub fn search_by_category(conn: &Connection, category: &str) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SELECT_COLUMNS} FROM transactions \
         WHERE LOWER(category) = LOWER(?1) ORDER BY rowid ASC"
    ))?;
    let rows = stmt.query_map([category], map_row)?;

    let mut transactions = Vec::new();
    for row in rows {
        transactions.push(row?);
    }
    Ok(transactions)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let date_str: String = row.get(1)?;
    let kind_str: String = row.get(3)?;
    let amount_str: String = row.get(4)?;

    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    let kind = TransactionKind::parse(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            Type::Text,
            format!("invalid transaction kind '{kind_str}'").into(),
        )
    })?;
    let amount = Decimal::from_str(&amount_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(Transaction {
        id: row.get(0)?,
        date,
        category: row.get(2)?,
        kind,
        amount,
        description: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_test_connection;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn create_test_transaction(id: &str, category: &str) -> Transaction {
        Transaction::new(
            id.to_string(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            category.to_string(),
            TransactionKind::Income,
            Decimal::new(10000, 2),
            "Test Transaction".to_string(),
        )
    }

    #[test]
    fn test_add_then_get_all_round_trips() {
        let conn = establish_test_connection().unwrap();
        let tx = create_test_transaction(&Uuid::new_v4().to_string(), "Salary");

        add_transaction(&conn, &tx).unwrap();

        let all = get_all_transactions(&conn).unwrap();
        assert_eq!(all, vec![tx]);
    }

    #[test]
    fn test_get_all_preserves_insertion_order() {
        let conn = establish_test_connection().unwrap();

        let mut newer = create_test_transaction("first", "Salary");
        newer.date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut older = create_test_transaction("second", "Groceries");
        older.date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        add_transaction(&conn, &newer).unwrap();
        add_transaction(&conn, &older).unwrap();

        let ids: Vec<String> = get_all_transactions(&conn)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_add_transaction_duplicate_id() {
        let conn = establish_test_connection().unwrap();
        let id = Uuid::new_v4().to_string();
        let tx = create_test_transaction(&id, "Salary");

        add_transaction(&conn, &tx).unwrap();
        let result = add_transaction(&conn, &tx);

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("UNIQUE constraint failed")
        );
    }

    #[test]
    fn test_remove_transaction_success() {
        let conn = establish_test_connection().unwrap();
        let id = Uuid::new_v4().to_string();
        let tx = create_test_transaction(&id, "Salary");

        add_transaction(&conn, &tx).unwrap();
        remove_transaction(&conn, &id).unwrap();

        assert!(get_all_transactions(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_remove_transaction_not_found() {
        let conn = establish_test_connection().unwrap();

        let result = remove_transaction(&conn, "missing-id");
        assert!(matches!(result, Err(AppError::TransactionNotFound(_))));
    }

    #[test]
    fn test_search_by_category_case_insensitive() {
        let conn = establish_test_connection().unwrap();

        add_transaction(&conn, &create_test_transaction("1", "Food")).unwrap();
        add_transaction(&conn, &create_test_transaction("2", "Transport")).unwrap();
        add_transaction(&conn, &create_test_transaction("3", "food")).unwrap();

        let found = search_by_category(&conn, "FOOD").unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|t| t.category.eq_ignore_ascii_case("Food")));
    }

    #[test]
    fn test_search_by_category_not_found() {
        let conn = establish_test_connection().unwrap();

        add_transaction(&conn, &create_test_transaction("1", "Food")).unwrap();

        let found = search_by_category(&conn, "Shopping").unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_corrupt_amount_surfaces_as_error() {
        let conn = establish_test_connection().unwrap();
        conn.execute(
            "INSERT INTO transactions (id, date, category, kind, amount, description) \
             VALUES ('corrupt', '2025-01-15', 'Groceries', 'expense', 'garbage', '')",
            [],
        )
        .unwrap();

        assert!(get_all_transactions(&conn).is_err());
    }

    #[test]
    fn test_corrupt_date_surfaces_as_error() {
        let conn = establish_test_connection().unwrap();
        conn.execute(
            "INSERT INTO transactions (id, date, category, kind, amount, description) \
             VALUES ('corrupt', '15/01/2025', 'Groceries', 'expense', '10.00', '')",
            [],
        )
        .unwrap();

        assert!(get_all_transactions(&conn).is_err());
    }
}
