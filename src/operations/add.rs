use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use crate::db::repository;
use crate::errors::{AppError, Result};
use crate::models::transaction::{Transaction, TransactionKind};

pub const MAX_DESCRIPTION_LEN: usize = 255;
pub const MAX_CATEGORY_LEN: usize = 50;

/// Raw form fields as captured by any front-end: shell prompts, CLI
/// arguments, the TUI add form, or a CSV row. All validation lives in
/// [`build_transaction`] so every entry path rejects the same inputs with
/// the same messages.
#[derive(Debug, Clone, Default)]
pub struct TransactionInput {
    pub date: String,
    pub category: String,
    pub kind: String,
    pub amount: String,
    pub description: String,
}

pub fn build_transaction(input: &TransactionInput) -> Result<Transaction> {
    build_with_reference_date(input, Local::now().date_naive())
}

/// Validates the raw fields and produces a transaction with a fresh UUID.
/// A blank date means `today`.
pub fn build_with_reference_date(
    input: &TransactionInput,
    today: NaiveDate,
) -> Result<Transaction> {
    let date_str = input.date.trim();
    let date = if date_str.is_empty() {
        today
    } else {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|_| AppError::InvalidDate(date_str.to_string()))?
    };

    let category = input.category.trim();
    if category.is_empty() {
        return Err(AppError::EmptyCategory);
    }
    // Limits count characters, not bytes.
    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(AppError::CategoryTooLong);
    }

    let kind_str = input.kind.trim();
    let kind =
        TransactionKind::parse(kind_str).ok_or_else(|| AppError::InvalidKind(kind_str.to_string()))?;

    let amount_str = input.amount.trim();
    let amount =
        Decimal::from_str(amount_str).map_err(|_| AppError::InvalidAmount(amount_str.to_string()))?;
    if amount <= Decimal::ZERO {
        return Err(AppError::NonPositiveAmount);
    }

    let description = input.description.trim();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(AppError::DescriptionTooLong);
    }

    Ok(Transaction::new(
        Uuid::new_v4().to_string(),
        date,
        category.to_string(),
        kind,
        amount,
        description.to_string(),
    ))
}

/// Validates, builds, and persists in one step; returns the stored
/// transaction so callers can echo it back to the user.
pub fn add_transaction(conn: &Connection, input: &TransactionInput) -> Result<Transaction> {
    let transaction = build_transaction(input)?;
    repository::add_transaction(conn, &transaction)?;
    Ok(transaction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::establish_test_connection;
    use crate::db::repository::get_all_transactions;

    fn valid_input() -> TransactionInput {
        TransactionInput {
            date: "2025-11-10".to_string(),
            category: "Groceries".to_string(),
            kind: "expense".to_string(),
            amount: "42.75".to_string(),
            description: "Weekly shop".to_string(),
        }
    }

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 12).unwrap()
    }

    #[test]
    fn test_build_transaction_success() {
        let tx = build_with_reference_date(&valid_input(), reference_date()).unwrap();

        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2025, 11, 10).unwrap());
        assert_eq!(tx.category, "Groceries");
        assert_eq!(tx.kind, TransactionKind::Expense);
        assert_eq!(tx.amount, Decimal::from_str("42.75").unwrap());
        assert_eq!(tx.description, "Weekly shop");
        assert!(Uuid::parse_str(&tx.id).is_ok());
    }

    #[test]
    fn test_blank_date_defaults_to_today() {
        let mut input = valid_input();
        input.date = "   ".to_string();

        let tx = build_with_reference_date(&input, reference_date()).unwrap();
        assert_eq!(tx.date, reference_date());
    }

    #[test]
    fn test_fields_are_trimmed() {
        let mut input = valid_input();
        input.category = "  Groceries  ".to_string();
        input.kind = " Expense ".to_string();
        input.amount = " 42.75 ".to_string();
        input.description = "  Weekly shop  ".to_string();

        let tx = build_with_reference_date(&input, reference_date()).unwrap();
        assert_eq!(tx.category, "Groceries");
        assert_eq!(tx.kind, TransactionKind::Expense);
        assert_eq!(tx.description, "Weekly shop");
    }

    #[test]
    fn test_invalid_date_rejected() {
        let mut input = valid_input();
        input.date = "10/11/2025".to_string();

        let result = build_with_reference_date(&input, reference_date());
        assert!(matches!(result, Err(AppError::InvalidDate(_))));
    }

    #[test]
    fn test_non_numeric_amount_rejected() {
        let mut input = valid_input();
        input.amount = "a lot".to_string();

        let result = build_with_reference_date(&input, reference_date());
        assert!(matches!(result, Err(AppError::InvalidAmount(_))));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let mut input = valid_input();
        input.amount = "0".to_string();

        let result = build_with_reference_date(&input, reference_date());
        assert!(matches!(result, Err(AppError::NonPositiveAmount)));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut input = valid_input();
        input.amount = "-5.00".to_string();

        let result = build_with_reference_date(&input, reference_date());
        assert!(matches!(result, Err(AppError::NonPositiveAmount)));
    }

    #[test]
    fn test_invalid_kind_rejected() {
        let mut input = valid_input();
        input.kind = "transfer".to_string();

        let result = build_with_reference_date(&input, reference_date());
        assert!(matches!(result, Err(AppError::InvalidKind(_))));
    }

    #[test]
    fn test_empty_category_rejected() {
        let mut input = valid_input();
        input.category = "  ".to_string();

        let result = build_with_reference_date(&input, reference_date());
        assert!(matches!(result, Err(AppError::EmptyCategory)));
    }

    #[test]
    fn test_category_too_long_rejected() {
        let mut input = valid_input();
        input.category = "x".repeat(MAX_CATEGORY_LEN + 1);

        let result = build_with_reference_date(&input, reference_date());
        assert!(matches!(result, Err(AppError::CategoryTooLong)));
    }

    #[test]
    fn test_description_too_long_rejected() {
        let mut input = valid_input();
        input.description = "x".repeat(MAX_DESCRIPTION_LEN + 1);

        let result = build_with_reference_date(&input, reference_date());
        assert!(matches!(result, Err(AppError::DescriptionTooLong)));
    }

    #[test]
    fn test_length_limits_count_characters_not_bytes() {
        // Two bytes per char: at the limit in chars, twice it in bytes.
        let mut input = valid_input();
        input.category = "é".repeat(MAX_CATEGORY_LEN);
        input.description = "é".repeat(MAX_DESCRIPTION_LEN);

        let tx = build_with_reference_date(&input, reference_date()).unwrap();
        assert_eq!(tx.category.chars().count(), MAX_CATEGORY_LEN);
        assert_eq!(tx.description.chars().count(), MAX_DESCRIPTION_LEN);

        input.category = "é".repeat(MAX_CATEGORY_LEN + 1);
        let result = build_with_reference_date(&input, reference_date());
        assert!(matches!(result, Err(AppError::CategoryTooLong)));
    }

    #[test]
    fn test_add_transaction_persists() {
        let conn = establish_test_connection().unwrap();

        let stored = add_transaction(&conn, &valid_input()).unwrap();

        let all = get_all_transactions(&conn).unwrap();
        assert_eq!(all, vec![stored]);
    }
}
