pub mod filter_service;
pub mod summary_service;

pub use filter_service::{CategoryFilter, FilterService, KindFilter, TransactionFilter};
pub use summary_service::{BudgetStatusLine, ChartSeries, MonthlyTotals, Overview, SummaryService};

#[cfg(test)]
mod tests;
