use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::errors::{AppError, Result};

/// Removes a transaction by its id. The input is validated as a UUID before
/// touching the database so typos get a clearer message than "not found".
pub fn remove_transaction(conn: &Connection, id_input: &str) -> Result<()> {
    let id_input = id_input.trim();
    if id_input.is_empty() {
        return Err(AppError::EmptyId);
    }

    let id = Uuid::parse_str(id_input).map_err(|_| AppError::InvalidId(id_input.to_string()))?;

    repository::remove_transaction(conn, &id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_test_connection;
    use crate::db::repository::{add_transaction, get_all_transactions};
    use crate::models::transaction::{Transaction, TransactionKind};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn stored_transaction(conn: &Connection) -> Transaction {
        let tx = Transaction::new(
            Uuid::new_v4().to_string(),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            "Dining Out".to_string(),
            TransactionKind::Expense,
            Decimal::new(1850, 2),
            "Lunch".to_string(),
        );
        add_transaction(conn, &tx).unwrap();
        tx
    }

    #[test]
    fn test_remove_transaction_success() {
        let conn = establish_test_connection().unwrap();
        let tx = stored_transaction(&conn);

        remove_transaction(&conn, &tx.id).unwrap();
        assert!(get_all_transactions(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_remove_accepts_uppercase_uuid() {
        let conn = establish_test_connection().unwrap();
        let tx = stored_transaction(&conn);

        remove_transaction(&conn, &tx.id.to_uppercase()).unwrap();
        assert!(get_all_transactions(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_remove_empty_id_rejected() {
        let conn = establish_test_connection().unwrap();

        let result = remove_transaction(&conn, "   ");
        assert!(matches!(result, Err(AppError::EmptyId)));
    }

    #[test]
    fn test_remove_malformed_id_rejected() {
        let conn = establish_test_connection().unwrap();

        let result = remove_transaction(&conn, "not-a-uuid");
        assert!(matches!(result, Err(AppError::InvalidId(_))));
    }

    #[test]
    fn test_remove_unknown_id_not_found() {
        let conn = establish_test_connection().unwrap();

        let result = remove_transaction(&conn, &Uuid::new_v4().to_string());
        assert!(matches!(result, Err(AppError::TransactionNotFound(_))));
    }
}
