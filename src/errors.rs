use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Error type covering storage failures and user-input validation.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to open file '{path}': {source}")]
    FileOpen {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid date '{0}'. Please use YYYY-MM-DD.")]
    InvalidDate(String),
    #[error("Invalid amount '{0}'. Please provide a valid decimal number.")]
    InvalidAmount(String),
    #[error("Amount must be a positive number.")]
    NonPositiveAmount,
    #[error("Invalid transaction type '{0}'. Use 'income' or 'expense'.")]
    InvalidKind(String),
    #[error("Category cannot be empty.")]
    EmptyCategory,
    #[error("Category too long (max 50 characters).")]
    CategoryTooLong,
    #[error("Description too long (max 255 characters).")]
    DescriptionTooLong,
    #[error("Transaction ID cannot be empty.")]
    EmptyId,
    #[error("Invalid transaction ID '{0}'. Please provide a valid UUID.")]
    InvalidId(String),
    #[error("Transaction with ID {0} not found.")]
    TransactionNotFound(String),
    #[error("CSV header mismatch: expected 'date,category,type,amount,description', got '{found}'.")]
    CsvHeaderMismatch { found: String },
    #[error("Invalid number of columns on line {line}: expected 5, got {count}.")]
    CsvColumnCount { line: usize, count: usize },
    #[error("Line {line}: {source}")]
    CsvRow {
        line: usize,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Wraps a row-level import failure with the 1-based CSV line it came from.
    pub fn at_line(self, line: usize) -> AppError {
        AppError::CsvRow {
            line,
            source: Box::new(self),
        }
    }
}
