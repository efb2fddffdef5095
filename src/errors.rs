use thiserror::Error;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid exchange rate: {0} (must be a positive number)")]
    InvalidRate(f64),
    #[error("Transaction {0} not found")]
    NotFound(u64),
    #[error("No template at index {0}")]
    TemplateNotFound(usize),
    #[error("Malformed row {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Export format `{0}` is not available in this build")]
    ExportUnavailable(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl LedgerError {
    /// True for failures raised while reading or writing durable storage.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            LedgerError::Persistence(_)
                | LedgerError::Io(_)
                | LedgerError::Serde(_)
                | LedgerError::Csv(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
