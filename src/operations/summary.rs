use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt::Write;

use crate::models::category::{self, CategoryGroup};
use crate::models::transaction::{Transaction, TransactionKind};

/// Income/expense split for one category or one month bucket.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TotalPair {
    pub income: Decimal,
    pub expense: Decimal,
}

impl TotalPair {
    fn record(&mut self, transaction: &Transaction) {
        match transaction.kind {
            TransactionKind::Income => self.income += transaction.amount,
            TransactionKind::Expense => self.expense += transaction.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSummary {
    pub income_total: Decimal,
    pub expense_total: Decimal,
    /// Per-category totals, sorted by category name.
    pub by_category: Vec<(String, TotalPair)>,
    /// Per-month (`YYYY-MM`) totals, sorted chronologically.
    pub by_month: Vec<(String, TotalPair)>,
    /// Expense totals split by catalog group.
    pub personal_expenses: Decimal,
    pub business_expenses: Decimal,
    pub uncategorized_expenses: Decimal,
    pub transaction_count: usize,
}

impl LedgerSummary {
    /// `sum(amount where kind=income) - sum(amount where kind=expense)`.
    pub fn balance(&self) -> Decimal {
        self.income_total - self.expense_total
    }
}

pub fn compute_summary(transactions: &[Transaction]) -> LedgerSummary {
    compute_summary_in_range(transactions, None, None)
}

/// Folds the ledger into totals. The optional bounds are inclusive; `None`
/// leaves that side open. An empty selection produces all-zero totals.
pub fn compute_summary_in_range(
    transactions: &[Transaction],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> LedgerSummary {
    let mut income_total = Decimal::ZERO;
    let mut expense_total = Decimal::ZERO;
    let mut personal_expenses = Decimal::ZERO;
    let mut business_expenses = Decimal::ZERO;
    let mut uncategorized_expenses = Decimal::ZERO;
    let mut by_category: HashMap<String, TotalPair> = HashMap::new();
    let mut by_month: HashMap<String, TotalPair> = HashMap::new();
    let mut transaction_count = 0usize;

    for transaction in transactions {
        if from.is_some_and(|f| transaction.date < f) {
            continue;
        }
        if to.is_some_and(|t| transaction.date > t) {
            continue;
        }
        transaction_count += 1;

        match transaction.kind {
            TransactionKind::Income => income_total += transaction.amount,
            TransactionKind::Expense => {
                expense_total += transaction.amount;
                match category::classify(&transaction.category) {
                    Some(CategoryGroup::Personal) => personal_expenses += transaction.amount,
                    Some(CategoryGroup::Business) => business_expenses += transaction.amount,
                    None => uncategorized_expenses += transaction.amount,
                }
            }
        }

        by_category
            .entry(transaction.category.clone())
            .or_default()
            .record(transaction);
        by_month
            .entry(transaction.month_key())
            .or_default()
            .record(transaction);
    }

    let mut by_category: Vec<(String, TotalPair)> = by_category.into_iter().collect();
    by_category.sort_by(|a, b| a.0.cmp(&b.0));

    // YYYY-MM keys sort chronologically as strings.
    let mut by_month: Vec<(String, TotalPair)> = by_month.into_iter().collect();
    by_month.sort_by(|a, b| a.0.cmp(&b.0));

    LedgerSummary {
        income_total,
        expense_total,
        by_category,
        by_month,
        personal_expenses,
        business_expenses,
        uncategorized_expenses,
        transaction_count,
    }
}

/// Renders the summary as the text panel printed by `summary` and the shell.
pub fn render_summary(summary: &LedgerSummary) -> String {
    if summary.transaction_count == 0 {
        return "No transactions recorded yet.".to_string();
    }

    let mut out = String::new();
    out.push_str("--- Ledger Summary ---\n\n");

    out.push_str("Summary by Category\n");
    for (name, totals) in &summary.by_category {
        let _ = writeln!(
            out,
            "  {:<40} income {:>12.2}   expense {:>12.2}",
            name, totals.income, totals.expense
        );
    }

    out.push_str("\nSummary by Month\n");
    for (month, totals) in &summary.by_month {
        let _ = writeln!(
            out,
            "  {:<40} income {:>12.2}   expense {:>12.2}",
            month, totals.income, totals.expense
        );
    }

    out.push_str("\nOverall Totals\n");
    let _ = writeln!(out, "  {:<24}{:>12.2}", "Personal expenses:", summary.personal_expenses);
    let _ = writeln!(out, "  {:<24}{:>12.2}", "Business expenses:", summary.business_expenses);
    let _ = writeln!(
        out,
        "  {:<24}{:>12.2}",
        "Uncategorized expenses:", summary.uncategorized_expenses
    );
    let _ = writeln!(out, "  {:<24}{:>12.2}", "Total income:", summary.income_total);
    let _ = writeln!(out, "  {:<24}{:>12.2}", "Total expenses:", summary.expense_total);
    let _ = writeln!(out, "  {:<24}{:>12.2}", "Balance:", summary.balance());

    out
}
