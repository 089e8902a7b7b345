use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Parses "income"/"expense" in any letter case.
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("income") {
            Some(TransactionKind::Income)
        } else if value.eq_ignore_ascii_case("expense") {
            Some(TransactionKind::Expense)
        } else {
            None
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded income or expense entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub category: String,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
}

impl Transaction {
    pub fn new(
        id: String,
        date: NaiveDate,
        category: String,
        kind: TransactionKind,
        amount: Decimal,
        description: String,
    ) -> Self {
        Self {
            id,
            date,
            category,
            kind,
            amount,
            description,
        }
    }

    /// Amount with the sign the running balance uses: income counts
    /// positive, expense negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    /// Month bucket key in `YYYY-MM` form.
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}
