//! Tabular import/export of ledger transactions.

use std::{
    fs::File,
    io::{self, BufWriter},
    path::Path,
};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::{debug, warn};

use crate::{
    currency::{parse_amount, Currency},
    errors::LedgerError,
    ledger::{normalize_category, parse_iso_date, Transaction, TransactionKind},
};

use super::Result;

/// Export header, in column order.
pub const EXPORT_HEADERS: [&str; 8] = [
    "id",
    "date",
    "type",
    "category",
    "description",
    "amount_base(USD)",
    "orig_amount",
    "orig_currency",
];

const DATE_KEYS: &[&str] = &["date"];
const TYPE_KEYS: &[&str] = &["type"];
const CATEGORY_KEYS: &[&str] = &["category"];
const DESCRIPTION_KEYS: &[&str] = &["description"];
const AMOUNT_KEYS: &[&str] = &["amount", "amount_orig", "orig_amount"];
const BASE_AMOUNT_KEYS: &[&str] = &["amount_base", "amount_base(USD)"];
const CURRENCY_KEYS: &[&str] = &["currency", "orig_currency"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Spreadsheet,
}

impl ExportFormat {
    /// Picks the format from the file extension (`.csv` or `.xlsx`).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(ExportFormat::Csv),
            Some("xlsx") => Ok(ExportFormat::Spreadsheet),
            _ => Err(LedgerError::InvalidInput(format!(
                "cannot export to `{}` (use a .csv or .xlsx file)",
                path.display()
            ))),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Spreadsheet => "xlsx",
        }
    }
}

/// Export formats available to this process, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportCapabilities {
    spreadsheet: bool,
}

impl ExportCapabilities {
    /// No spreadsheet writer is compiled into this build.
    pub fn detect() -> Self {
        Self { spreadsheet: false }
    }

    pub fn supports(&self, format: ExportFormat) -> bool {
        match format {
            ExportFormat::Csv => true,
            ExportFormat::Spreadsheet => self.spreadsheet,
        }
    }
}

impl Default for ExportCapabilities {
    fn default() -> Self {
        Self::detect()
    }
}

/// Writes every transaction, header first, in the order given.
pub fn export_csv<W: io::Write>(transactions: &[Transaction], writer: W) -> Result<()> {
    let mut out = WriterBuilder::new().has_headers(false).from_writer(writer);
    out.write_record(EXPORT_HEADERS)?;
    for txn in transactions {
        out.write_record([
            txn.id().to_string(),
            txn.date().format("%Y-%m-%d").to_string(),
            txn.kind().as_str().to_string(),
            txn.category().to_string(),
            txn.description().to_string(),
            txn.amount_base().to_string(),
            txn.amount_entered().to_string(),
            txn.entry_currency().code().to_string(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Exports to `path`, choosing the format from its extension.
pub fn export_to_path(
    transactions: &[Transaction],
    path: &Path,
    capabilities: ExportCapabilities,
) -> Result<ExportFormat> {
    let format = ExportFormat::from_path(path)?;
    if !capabilities.supports(format) {
        return Err(LedgerError::ExportUnavailable(format.extension().into()));
    }
    let file = File::create(path)?;
    export_csv(transactions, BufWriter::new(file))?;
    debug!(path = %path.display(), rows = transactions.len(), "exported transactions");
    Ok(format)
}

/// A validated import row, not yet assigned an id.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub line: u64,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
    pub amount: ImportAmount,
    pub currency: Currency,
}

/// Which amount column a row supplied. The entered amount wins when both exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImportAmount {
    Entered(f64),
    Base(f64),
}

/// A row that failed validation and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: u64,
    pub reason: String,
}

impl From<RowError> for LedgerError {
    fn from(err: RowError) -> Self {
        LedgerError::MalformedRow {
            line: err.line,
            reason: err.reason,
        }
    }
}

/// Outcome of an import batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<RowError>,
}

impl ImportReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Parsed rows plus the rows that were rejected.
#[derive(Debug, Default)]
pub struct ParsedImport {
    pub rows: Vec<ImportRow>,
    pub skipped: Vec<RowError>,
}

/// Reads and validates CSV rows. Bad rows are collected, never fatal; only an
/// unreadable header aborts the batch.
pub fn parse_import<R: io::Read>(reader: R) -> Result<ParsedImport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::from_headers(rdr.headers()?);

    let mut parsed = ParsedImport::default();
    for (idx, result) in rdr.records().enumerate() {
        let fallback_line = idx as u64 + 2;
        let outcome = result
            .map_err(|err| RowError {
                line: err
                    .position()
                    .map(|pos| pos.line())
                    .unwrap_or(fallback_line),
                reason: err.to_string(),
            })
            .and_then(|record| {
                let line = record
                    .position()
                    .map(|pos| pos.line())
                    .unwrap_or(fallback_line);
                columns.parse_row(&record, line)
            });
        match outcome {
            Ok(row) => parsed.rows.push(row),
            Err(err) => {
                warn!(line = err.line, reason = %err.reason, "skipping import row");
                parsed.skipped.push(err);
            }
        }
    }
    Ok(parsed)
}

struct Columns {
    date: Option<usize>,
    kind: Option<usize>,
    category: Option<usize>,
    description: Option<usize>,
    amount: Option<usize>,
    amount_base: Option<usize>,
    currency: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| headers.iter().position(|header| header == *key))
        };
        Self {
            date: find(DATE_KEYS),
            kind: find(TYPE_KEYS),
            category: find(CATEGORY_KEYS),
            description: find(DESCRIPTION_KEYS),
            amount: find(AMOUNT_KEYS),
            amount_base: find(BASE_AMOUNT_KEYS),
            currency: find(CURRENCY_KEYS),
        }
    }

    fn parse_row(&self, record: &StringRecord, line: u64) -> std::result::Result<ImportRow, RowError> {
        let fail = |reason: String| RowError { line, reason };
        let field = |col: Option<usize>| {
            col.and_then(|idx| record.get(idx))
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let date_raw = field(self.date).ok_or_else(|| fail("missing date".into()))?;
        let date = parse_iso_date(date_raw).map_err(|err| fail(err.to_string()))?;
        let kind_raw = field(self.kind).ok_or_else(|| fail("missing type".into()))?;
        let kind = exact_kind(kind_raw).ok_or_else(|| {
            fail(format!(
                "unknown transaction type `{}` (expected income or expense)",
                kind_raw
            ))
        })?;
        let currency = match field(self.currency) {
            Some(code) => code.parse::<Currency>().map_err(|err| fail(err.to_string()))?,
            None => Currency::Usd,
        };
        let amount = match (field(self.amount), field(self.amount_base)) {
            (Some(raw), _) => ImportAmount::Entered(parse_amount(raw).map_err(|err| fail(err.to_string()))?),
            (None, Some(raw)) => ImportAmount::Base(parse_amount(raw).map_err(|err| fail(err.to_string()))?),
            (None, None) => return Err(fail("missing amount".into())),
        };

        Ok(ImportRow {
            line,
            date,
            kind,
            category: normalize_category(field(self.category).unwrap_or_default()),
            description: field(self.description).unwrap_or_default().to_string(),
            amount,
            currency,
        })
    }
}

/// Files carry the lowercase tokens export writes; anything else is rejected.
fn exact_kind(raw: &str) -> Option<TransactionKind> {
    [TransactionKind::Income, TransactionKind::Expense]
        .into_iter()
        .find(|kind| kind.as_str() == raw)
}
