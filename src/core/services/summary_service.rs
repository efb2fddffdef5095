//! Monthly aggregation over a ledger snapshot.
//!
//! Everything is recomputed from the full transaction list on each call; no
//! totals are cached between calls.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::core::utils::{precise_sum, today};
use crate::ledger::{Ledger, Transaction, TransactionKind};

/// Income and expense sums for one calendar month, in base currency.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthlyTotals {
    pub income: f64,
    pub expense: f64,
}

impl MonthlyTotals {
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// Budget usage for one category. Negative `remaining` means over budget.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatusLine {
    pub category: String,
    pub budget: f64,
    pub spent: f64,
    pub remaining: f64,
    pub over: bool,
}

/// Labels and values handed to a chart renderer, already in display currency.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Dashboard numbers for the current month, in base currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub month: NaiveDate,
    pub totals: MonthlyTotals,
    pub remaining: f64,
    pub statuses: Vec<BudgetStatusLine>,
}

pub struct SummaryService;

impl SummaryService {
    pub fn monthly_totals(ledger: &Ledger) -> MonthlyTotals {
        Self::monthly_totals_for(ledger, today())
    }

    /// Sums the month containing `reference`, split by kind.
    pub fn monthly_totals_for(ledger: &Ledger, reference: NaiveDate) -> MonthlyTotals {
        let month: Vec<&Transaction> = in_month(ledger, reference).collect();
        let sum_kind = |kind: TransactionKind| {
            precise_sum(
                month
                    .iter()
                    .filter(|txn| txn.kind() == kind)
                    .map(|txn| txn.amount_base()),
            )
        };
        let totals = MonthlyTotals {
            income: sum_kind(TransactionKind::Income),
            expense: sum_kind(TransactionKind::Expense),
        };
        debug!(
            month = %month_label(reference),
            income = totals.income,
            expense = totals.expense,
            "monthly totals"
        );
        totals
    }

    pub fn category_spend(ledger: &Ledger) -> BTreeMap<String, f64> {
        Self::category_spend_for(ledger, today())
    }

    /// Expense totals per category for the month containing `reference`.
    pub fn category_spend_for(ledger: &Ledger, reference: NaiveDate) -> BTreeMap<String, f64> {
        let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for txn in in_month(ledger, reference).filter(|txn| txn.is_expense()) {
            grouped
                .entry(txn.category().to_string())
                .or_default()
                .push(txn.amount_base());
        }
        grouped
            .into_iter()
            .map(|(category, amounts)| (category, precise_sum(amounts)))
            .collect()
    }

    pub fn remaining(ledger: &Ledger, category: Option<&str>) -> f64 {
        Self::remaining_for(ledger, category, today())
    }

    /// Budget minus spend for one category, or across all budgets and all
    /// spend when `category` is `None` or blank. Not clamped at zero.
    pub fn remaining_for(ledger: &Ledger, category: Option<&str>, reference: NaiveDate) -> f64 {
        let spend = Self::category_spend_for(ledger, reference);
        match category.filter(|name| !name.trim().is_empty()) {
            Some(name) => {
                let budget = ledger.budget(name).unwrap_or(0.0);
                let used = spend.get(name).copied().unwrap_or(0.0);
                budget - used
            }
            None => {
                precise_sum(ledger.budgets().values().copied())
                    - precise_sum(spend.values().copied())
            }
        }
    }

    pub fn budget_statuses(ledger: &Ledger) -> Vec<BudgetStatusLine> {
        Self::budget_statuses_for(ledger, today())
    }

    /// One line per budgeted category, in category order.
    pub fn budget_statuses_for(ledger: &Ledger, reference: NaiveDate) -> Vec<BudgetStatusLine> {
        let spend = Self::category_spend_for(ledger, reference);
        ledger
            .budgets()
            .iter()
            .map(|(category, budget)| {
                let spent = spend.get(category).copied().unwrap_or(0.0);
                BudgetStatusLine {
                    category: category.clone(),
                    budget: *budget,
                    spent,
                    remaining: budget - spent,
                    over: spent > *budget,
                }
            })
            .collect()
    }

    pub fn overview(ledger: &Ledger) -> Overview {
        Self::overview_for(ledger, today())
    }

    pub fn overview_for(ledger: &Ledger, reference: NaiveDate) -> Overview {
        Overview {
            month: reference,
            totals: Self::monthly_totals_for(ledger, reference),
            remaining: Self::remaining_for(ledger, None, reference),
            statuses: Self::budget_statuses_for(ledger, reference),
        }
    }

    pub fn daily_net_flow(ledger: &Ledger) -> ChartSeries {
        Self::daily_net_flow_for(ledger, today())
    }

    /// Income minus expense per day of the month, labelled `01`..`31`.
    /// Only days with activity appear.
    pub fn daily_net_flow_for(ledger: &Ledger, reference: NaiveDate) -> ChartSeries {
        let converter = ledger.converter();
        let mut days: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for txn in in_month(ledger, reference) {
            let signed = match txn.kind() {
                TransactionKind::Income => txn.amount_base(),
                TransactionKind::Expense => -txn.amount_base(),
            };
            days.entry(txn.date().day()).or_default().push(signed);
        }
        let mut series = ChartSeries::default();
        for (day, amounts) in days {
            series.labels.push(format!("{:02}", day));
            series.values.push(converter.from_base(precise_sum(amounts)));
        }
        series
    }

    pub fn category_breakdown(ledger: &Ledger) -> ChartSeries {
        Self::category_breakdown_for(ledger, today())
    }

    /// Expense per category for the month, labels sorted by name.
    pub fn category_breakdown_for(ledger: &Ledger, reference: NaiveDate) -> ChartSeries {
        let converter = ledger.converter();
        let (labels, values) = Self::category_spend_for(ledger, reference)
            .into_iter()
            .map(|(category, amount)| (category, converter.from_base(amount)))
            .unzip();
        ChartSeries { labels, values }
    }

    pub fn income_vs_expense(ledger: &Ledger) -> ChartSeries {
        Self::income_vs_expense_for(ledger, today())
    }

    /// Two buckets, `Income` and `Expenses`, for the month.
    pub fn income_vs_expense_for(ledger: &Ledger, reference: NaiveDate) -> ChartSeries {
        let converter = ledger.converter();
        let totals = Self::monthly_totals_for(ledger, reference);
        ChartSeries {
            labels: vec!["Income".into(), "Expenses".into()],
            values: vec![
                converter.from_base(totals.income),
                converter.from_base(totals.expense),
            ],
        }
    }
}

fn in_month(ledger: &Ledger, reference: NaiveDate) -> impl Iterator<Item = &Transaction> {
    ledger.transactions().iter().filter(move |txn| {
        let date = txn.date();
        date.year() == reference.year() && date.month() == reference.month()
    })
}

fn month_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}
