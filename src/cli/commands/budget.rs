use crate::cli::commands::{parse_currency, parse_money, usage};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io as cli_io;
use crate::cli::output::{section, signed};
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::core::services::{BudgetStatusLine, SummaryService};
use crate::currency::CurrencyConverter;

const BUDGET_USAGE: &str = "budget <set <category> <amount> [USD|PHP] | remove <category> | list>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("budget", "Manage monthly category budgets", BUDGET_USAGE, cmd_budget),
        CommandEntry::new(
            "remaining",
            "Budget left this month, for one category or overall",
            "remaining [category]",
            cmd_remaining,
        ),
    ]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["list"] => list_budgets(context),
        ["set", category, amount] => set_budget(context, category, amount, None),
        ["set", category, amount, currency] => set_budget(context, category, amount, Some(*currency)),
        ["remove", category] => {
            match context.store.remove_budget(category)? {
                Some(_) => cli_io::print_success(format!("Removed budget for {}.", category.trim())),
                None => cli_io::print_info(format!("No budget set for {}.", category.trim())),
            }
            Ok(())
        }
        _ => Err(usage(BUDGET_USAGE)),
    }
}

/// Amounts default to the display currency, matching how budgets are shown.
fn set_budget(
    context: &mut ShellContext,
    category: &str,
    amount: &str,
    currency: Option<&str>,
) -> CommandResult {
    if category.trim().is_empty() {
        return Err(CommandError::InvalidArguments("budget category cannot be blank".into()));
    }
    let amount = parse_money(amount)?;
    let currency = match currency {
        Some(raw) => parse_currency(raw)?,
        None => context.store.settings().display_currency,
    };
    let limit = context.store.set_budget(category, amount, currency)?;
    cli_io::print_success(format!(
        "Budget for {} set to {} per month.",
        category.trim(),
        context.store.converter().format_display(limit)
    ));
    Ok(())
}

fn list_budgets(context: &ShellContext) -> CommandResult {
    let statuses = SummaryService::budget_statuses(context.store.ledger());
    if statuses.is_empty() {
        cli_io::print_info("No category budgets set.");
        return Ok(());
    }
    section("Budgets (this month)");
    cli_io::print_info(render_statuses(&context.store.converter(), &statuses));
    Ok(())
}

fn cmd_remaining(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let category = (!args.is_empty()).then(|| args.join(" "));
    let value = SummaryService::remaining(context.store.ledger(), category.as_deref());
    let shown = signed(context.store.converter().format_display(value), value);
    match category.as_deref().map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => cli_io::print_info(format!("Remaining for {}: {}", name, shown)),
        None => cli_io::print_info(format!("Remaining overall: {}", shown)),
    }
    Ok(())
}

pub(crate) fn render_statuses(converter: &CurrencyConverter, statuses: &[BudgetStatusLine]) -> String {
    let mut table = Table::new(vec![
        TableColumn::left("Category"),
        TableColumn::right("Budget"),
        TableColumn::right("Spent"),
        TableColumn::right("Left"),
        TableColumn::left("Status"),
    ]);
    for line in statuses {
        table.push(vec![
            line.category.clone(),
            converter.format_display(line.budget),
            converter.format_display(line.spent),
            signed(converter.format_display(line.remaining), line.remaining),
            if line.over { "OVER" } else { "OK" }.to_string(),
        ]);
    }
    table.render()
}
