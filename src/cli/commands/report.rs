use crate::cli::commands::budget::render_statuses;
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io as cli_io;
use crate::cli::output::{section, signed};
use crate::cli::registry::CommandEntry;
use crate::core::services::{ChartSeries, SummaryService};
use crate::currency::{format_money, Currency};

const CHART_USAGE: &str = "chart <daily|categories|totals>";
const BAR_WIDTH: usize = 30;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "summary",
            "This month's income, expenses, and budget status",
            "summary",
            cmd_summary,
        ),
        CommandEntry::new("chart", "Text charts for the current month", CHART_USAGE, cmd_chart),
    ]
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let ledger = context.store.ledger();
    let converter = ledger.converter();
    let overview = SummaryService::overview(ledger);
    let net = overview.totals.net();

    section(format!("Summary {}", overview.month.format("%B %Y")));
    cli_io::print_info(format!("  Income   : {}", converter.format_display(overview.totals.income)));
    cli_io::print_info(format!("  Expenses : {}", converter.format_display(overview.totals.expense)));
    cli_io::print_info(format!("  Net      : {}", signed(converter.format_display(net), net)));
    cli_io::print_info(format!(
        "  Remaining: {}",
        signed(converter.format_display(overview.remaining), overview.remaining)
    ));
    if overview.statuses.is_empty() {
        cli_io::print_info("No category budgets set.");
    } else {
        cli_io::print_info(render_statuses(&converter, &overview.statuses));
    }
    Ok(())
}

fn cmd_chart(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let ledger = context.store.ledger();
    let (title, series) = match args {
        ["daily"] => ("Net flow by day", SummaryService::daily_net_flow(ledger)),
        ["categories"] => ("Expenses by category", SummaryService::category_breakdown(ledger)),
        ["totals"] => ("Income vs expenses", SummaryService::income_vs_expense(ledger)),
        _ => return Err(crate::cli::commands::usage(CHART_USAGE)),
    };
    section(title);
    if series.is_empty() {
        cli_io::print_info("Nothing recorded this month.");
        return Ok(());
    }
    for line in render_bars(&series, ledger.settings().display_currency) {
        cli_io::print_info(line);
    }
    Ok(())
}

/// One line per point: label, a bar scaled to the largest magnitude, and the value.
pub(crate) fn render_bars(series: &ChartSeries, currency: Currency) -> Vec<String> {
    let label_width = series.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let peak = series.values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    series
        .iter()
        .map(|(label, value)| {
            let cells = if peak > 0.0 {
                ((value.abs() / peak) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            let mark = if value < 0.0 { '-' } else { '#' };
            format!(
                "{:<lw$} | {:<bw$} {}",
                label,
                mark.to_string().repeat(cells),
                format_money(value, currency),
                lw = label_width,
                bw = BAR_WIDTH,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_to_largest_magnitude() {
        let series = ChartSeries {
            labels: vec!["Income".into(), "Expenses".into()],
            values: vec![100.0, 50.0],
        };
        let lines = render_bars(&series, Currency::Usd);
        assert!(lines[0].starts_with("Income   | ##############################"));
        assert!(lines[1].contains(&"#".repeat(15)));
        assert!(lines[1].ends_with("$50.00"));
    }

    #[test]
    fn negative_days_use_minus_marks() {
        let series = ChartSeries {
            labels: vec!["03".into()],
            values: vec![-20.0],
        };
        let line = &render_bars(&series, Currency::Php)[0];
        assert!(line.contains(&"-".repeat(BAR_WIDTH)));
        assert!(line.ends_with("-₱20.00"));
    }
}
