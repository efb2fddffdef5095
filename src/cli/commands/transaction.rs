use chrono::NaiveDate;

use crate::cli::commands::{parse_currency, parse_id, parse_money, usage, Args};
use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::io as cli_io;
use crate::cli::output::{section, signed};
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::core::services::{FilterService, TransactionFilter};
use crate::currency::{format_money, parse_amount, Currency, CurrencyConverter};
use crate::ledger::{
    parse_iso_date, NewTransaction, Template, Transaction, TransactionKind, TransactionPatch,
};

const ADD_USAGE: &str = "add <income|expense> <amount> [category] [description] [--currency USD|PHP] [--date YYYY-MM-DD] [--template]";
const QUICK_USAGE: &str = "quick <amount> [category] [description]";
const EDIT_USAGE: &str = "edit <id> [--date YYYY-MM-DD] [--type income|expense] [--category NAME] [--description TEXT] [--amount N] [--currency USD|PHP]";
const FILTER_USAGE: &str = "filter [--from YYYY-MM-DD] [--to YYYY-MM-DD] [--type income|expense|All] [--category NAME|All] [--search TEXT]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("add", "Record an income or expense", ADD_USAGE, cmd_add),
        CommandEntry::new(
            "quick",
            "Record an expense in the display currency",
            QUICK_USAGE,
            cmd_quick,
        ),
        CommandEntry::new("edit", "Change fields of a transaction", EDIT_USAGE, cmd_edit),
        CommandEntry::new("delete", "Delete a transaction", "delete <id>", cmd_delete),
        CommandEntry::new("list", "Show transactions, newest first", "list [count]", cmd_list),
        CommandEntry::new("filter", "Show transactions matching filters", FILTER_USAGE, cmd_filter),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() && context.mode() == CliMode::Interactive {
        return add_wizard(context, false);
    }
    let args = Args::parse(args, &["template"])?;
    let (Some(kind), Some(amount)) = (args.positional(0), args.positional(1)) else {
        return Err(usage(ADD_USAGE));
    };
    let kind: TransactionKind = kind.parse()?;
    let amount = parse_money(amount)?;
    let currency = match args.option("currency") {
        Some(raw) => parse_currency(raw)?,
        None => context.store.settings().display_currency,
    };
    let date = args.option("date").map(parse_iso_date).transpose()?;
    let draft = NewTransaction::new(
        kind,
        args.positional(2).unwrap_or_default(),
        args.rest(3).unwrap_or_default(),
        amount,
        currency,
    );
    record(context, draft, date, args.has("template"))
}

fn cmd_quick(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() && context.mode() == CliMode::Interactive {
        return add_wizard(context, true);
    }
    let args = Args::parse(args, &[])?;
    let amount = parse_money(args.positional(0).ok_or_else(|| usage(QUICK_USAGE))?)?;
    let draft = NewTransaction::expense(
        args.positional(1).unwrap_or_default(),
        amount,
        context.store.settings().display_currency,
    )
    .with_description(args.rest(2).unwrap_or_default());
    record(context, draft, None, false)
}

fn record(
    context: &mut ShellContext,
    draft: NewTransaction,
    date: Option<NaiveDate>,
    save_template: bool,
) -> CommandResult {
    let template = save_template.then(|| Template::from_draft(&draft));
    let txn = match date {
        Some(date) => context.store.add_on(draft, date)?,
        None => context.store.add(draft)?,
    };
    let converter = context.store.converter();
    cli_io::print_success(format!(
        "Added #{} {} {} in {} on {}.",
        txn.id(),
        txn.kind(),
        converter.format_display(txn.amount_base()),
        txn.category(),
        txn.date()
    ));
    if let Some(template) = template {
        let name = template.name.clone();
        context.store.save_template(template)?;
        cli_io::print_info(format!("Saved template `{}`.", name));
    }
    Ok(())
}

/// Prompts for each field. Quick mode skips type, currency and the template offer.
fn add_wizard(context: &mut ShellContext, quick: bool) -> CommandResult {
    let display = context.store.settings().display_currency;
    let (draft, save_template) = {
        let theme = &context.theme;
        let kind = if quick {
            TransactionKind::Expense
        } else {
            let kinds = ["expense", "income"];
            kinds[cli_io::select(theme, "Type", &kinds, 0)?].parse::<TransactionKind>()?
        };
        let amount = loop {
            let raw = cli_io::prompt_text(theme, "Amount", "")?;
            match parse_amount(&raw) {
                Ok(amount) => break amount,
                Err(err) => cli_io::print_warning(err),
            }
        };
        let currency = if quick {
            display
        } else {
            let codes: Vec<&str> = Currency::ALL.iter().map(|c| c.code()).collect();
            let default = Currency::ALL.iter().position(|c| *c == display).unwrap_or(0);
            Currency::ALL[cli_io::select(theme, "Currency", &codes, default)?]
        };
        let category = cli_io::prompt_text(theme, "Category", "")?;
        let description = cli_io::prompt_text(theme, "Description", "")?;
        let save_template =
            !quick && cli_io::confirm_action(theme, "Save as template?", false)?;
        (
            NewTransaction::new(kind, category, description, amount, currency),
            save_template,
        )
    };
    record(context, draft, None, save_template)
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[])?;
    let id = parse_id(args.positional(0).ok_or_else(|| usage(EDIT_USAGE))?)?;
    let patch = TransactionPatch {
        date: args.option("date").map(str::to_string),
        kind: args
            .option("type")
            .map(|raw| raw.parse::<TransactionKind>())
            .transpose()?,
        category: args.option("category").map(str::to_string),
        description: args.option("description").map(str::to_string),
        amount: args.option("amount").map(parse_money).transpose()?,
        currency: args.option("currency").map(parse_currency).transpose()?,
    };
    if patch.is_empty() {
        return Err(CommandError::InvalidArguments(
            "nothing to change; pass at least one --field".into(),
        ));
    }
    let updated = context.store.edit(id, patch.clone())?;
    if let Some(raw) = patch.date.as_deref() {
        if parse_iso_date(raw).is_err() {
            cli_io::print_warning(format!(
                "Ignored invalid date `{}`; kept {}.",
                raw,
                updated.date()
            ));
        }
    }
    cli_io::print_success(format!(
        "Updated #{}: {} {} in {} on {}.",
        updated.id(),
        updated.kind(),
        context.store.converter().format_display(updated.amount_base()),
        updated.category(),
        updated.date()
    ));
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [raw] = args else {
        return Err(usage("delete <id>"));
    };
    let id = parse_id(raw)?;
    if context.store.get(id).is_none() {
        cli_io::print_info(format!("No transaction #{}; nothing deleted.", id));
        return Ok(());
    }
    if !context.confirm(&format!("Delete transaction #{}?", id))? {
        cli_io::print_info("Cancelled.");
        return Ok(());
    }
    if context.store.delete(id)?.is_some() {
        cli_io::print_success(format!("Deleted #{}.", id));
    }
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let limit = match args.first() {
        Some(raw) => raw.parse::<usize>().map_err(|_| usage("list [count]"))?,
        None => usize::MAX,
    };
    let rows = context.store.recent(limit);
    if rows.is_empty() {
        cli_io::print_info("No transactions yet.");
        return Ok(());
    }
    section("Transactions");
    cli_io::print_info(render_transactions(&context.store.converter(), &rows));
    Ok(())
}

fn cmd_filter(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[])?;
    if args.positional_len() > 0 {
        return Err(usage(FILTER_USAGE));
    }
    let filter = TransactionFilter::parse(
        args.option("from").unwrap_or_default(),
        args.option("to").unwrap_or_default(),
        args.option("type").unwrap_or_default(),
        args.option("category").unwrap_or_default(),
        args.option("search").unwrap_or_default(),
    )?;
    let all = context.store.list();
    let mut rows = FilterService::apply(all, &filter);
    rows.reverse();
    section("Filtered transactions");
    if rows.is_empty() {
        cli_io::print_info("No transactions match.");
    } else {
        cli_io::print_info(render_transactions(&context.store.converter(), &rows));
    }
    cli_io::print_info(format!("{} of {} transactions shown.", rows.len(), all.len()));
    Ok(())
}

pub(crate) fn render_transactions(converter: &CurrencyConverter, rows: &[&Transaction]) -> String {
    let mut table = Table::new(vec![
        TableColumn::right("ID"),
        TableColumn::left("Date"),
        TableColumn::left("Type"),
        TableColumn::left("Category").max_width(18),
        TableColumn::left("Description").max_width(28),
        TableColumn::right("Amount"),
        TableColumn::right("Entered"),
    ]);
    for txn in rows {
        let signed_base = match txn.kind() {
            TransactionKind::Income => txn.amount_base(),
            TransactionKind::Expense => -txn.amount_base(),
        };
        table.push(vec![
            txn.id().to_string(),
            txn.date().to_string(),
            txn.kind().to_string(),
            txn.category().to_string(),
            txn.description().to_string(),
            signed(converter.format_display(signed_base), signed_base),
            format_money(txn.amount_entered(), txn.entry_currency()),
        ]);
    }
    table.render()
}
