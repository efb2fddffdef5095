use crate::cli::commands::{parse_currency, parse_money, parse_position, usage, Args};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io as cli_io;
use crate::cli::output::section;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};
use crate::currency::format_money;
use crate::ledger::{NewTransaction, Template, TransactionKind};

const TEMPLATE_USAGE: &str = "template <save|list|use|delete> ...";
const SAVE_USAGE: &str = "template save <income|expense> <amount> [category] [description] [--currency USD|PHP] [--name NAME]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "template",
        "Save and reuse transaction templates",
        "template <save <type> <amount> [category] [description] [--currency C] [--name N] | list | use <n> | delete <n>>",
        cmd_template,
    )]
}

fn cmd_template(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return list_templates(context);
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "save" => save_template(context, rest),
        "list" => list_templates(context),
        "use" => use_template(context, rest),
        "delete" | "remove" => delete_template(context, rest),
        _ => Err(usage(TEMPLATE_USAGE)),
    }
}

fn save_template(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args, &[])?;
    let (Some(kind), Some(amount)) = (args.positional(0), args.positional(1)) else {
        return Err(usage(SAVE_USAGE));
    };
    let kind: TransactionKind = kind.parse()?;
    let currency = match args.option("currency") {
        Some(raw) => parse_currency(raw)?,
        None => context.store.settings().display_currency,
    };
    let draft = NewTransaction::new(
        kind,
        args.positional(2).unwrap_or_default(),
        args.rest(3).unwrap_or_default(),
        parse_money(amount)?,
        currency,
    );
    let template = Template::from_draft(&draft).named(args.option("name").unwrap_or_default());
    let name = template.name.clone();
    context.store.save_template(template)?;
    cli_io::print_success(format!(
        "Saved template `{}` as #{}.",
        name,
        context.store.templates().len()
    ));
    Ok(())
}

fn list_templates(context: &ShellContext) -> CommandResult {
    let templates = context.store.templates();
    if templates.is_empty() {
        cli_io::print_info("No templates saved.");
        return Ok(());
    }
    section("Templates");
    let mut table = Table::new(vec![
        TableColumn::right("#"),
        TableColumn::left("Name"),
        TableColumn::left("Type"),
        TableColumn::left("Category"),
        TableColumn::right("Amount"),
    ]);
    for (idx, template) in templates.iter().enumerate() {
        table.push(vec![
            (idx + 1).to_string(),
            template.name.clone(),
            template.kind.to_string(),
            template.category.clone(),
            format_money(template.amount, template.currency),
        ]);
    }
    cli_io::print_info(table.render());
    Ok(())
}

fn use_template(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [position] = args else {
        return Err(usage("template use <n>"));
    };
    let index = parse_position(position)?;
    if index >= context.store.templates().len() {
        return Err(missing(index));
    }
    let txn = context.store.apply_template(index)?;
    cli_io::print_success(format!(
        "Added #{} {} {} in {} from template #{}.",
        txn.id(),
        txn.kind(),
        context.store.converter().format_display(txn.amount_base()),
        txn.category(),
        index + 1
    ));
    Ok(())
}

fn delete_template(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [position] = args else {
        return Err(usage("template delete <n>"));
    };
    let index = parse_position(position)?;
    let Some(name) = context.store.templates().get(index).map(|t| t.name.clone()) else {
        return Err(missing(index));
    };
    if !context.confirm(&format!("Delete template `{}`?", name))? {
        cli_io::print_info("Cancelled.");
        return Ok(());
    }
    context.store.remove_template(index)?;
    cli_io::print_success(format!("Deleted template `{}`.", name));
    Ok(())
}

fn missing(index: usize) -> CommandError {
    CommandError::InvalidArguments(format!(
        "no template #{}; see `template list`",
        index + 1
    ))
}
