pub mod csv_backend;
pub mod json_backend;

use std::sync::RwLock;

use crate::{errors::LedgerError, ledger::Ledger};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Abstraction over durable storage for the ledger document.
pub trait StorageBackend: Send + Sync {
    /// Returns `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<Ledger>>;
    fn save(&self, ledger: &Ledger) -> Result<()>;

    /// Human-readable location used in log lines.
    fn describe(&self) -> String {
        String::from("storage")
    }
}

/// Keeps the serialized document in memory. Useful for tests and benchmarks.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: RwLock<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<String> {
        self.document.read().ok().and_then(|guard| guard.clone())
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self) -> Result<Option<Ledger>> {
        match self.snapshot() {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let json = serde_json::to_string(ledger)?;
        let mut guard = self
            .document
            .write()
            .map_err(|_| LedgerError::Persistence("memory storage lock poisoned".into()))?;
        *guard = Some(json);
        Ok(())
    }

    fn describe(&self) -> String {
        String::from("memory")
    }
}

pub use csv_backend::{
    export_csv, parse_import, ExportCapabilities, ExportFormat, ImportReport, ImportRow, RowError,
    EXPORT_HEADERS,
};
pub use json_backend::{load_ledger_from_path, save_ledger_to_path, JsonStorage};
