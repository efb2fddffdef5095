use chrono::Local;

use crate::cli::commands::{parse_currency, usage};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io as cli_io;
use crate::cli::output::section;
use crate::cli::registry::CommandEntry;
use crate::config::Theme;
use crate::currency::{format_number, Currency};
use crate::reminder::{due_reminders, ReminderSchedule};

const REMINDERS_USAGE: &str = "reminders [show | set <daily HH:MM> <Mon..Sun> <weekly HH:MM> | check]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "rate",
            "Show or set the exchange rate (PHP per 1 USD)",
            "rate [value]",
            cmd_rate,
        ),
        CommandEntry::new(
            "display",
            "Show or set the display currency",
            "display [USD|PHP]",
            cmd_display,
        ),
        CommandEntry::new("theme", "Show or change the color theme", "theme [light|dark|toggle]", cmd_theme),
        CommandEntry::new("reminders", "Show or change reminder times", REMINDERS_USAGE, cmd_reminders),
    ]
}

fn cmd_rate(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {}
        [raw] => {
            let rate = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| CommandError::InvalidArguments(format!("`{}` is not a number", raw)))?;
            context.store.set_rate(rate)?;
            cli_io::print_success("Exchange rate updated. Existing entries keep their stored amounts.");
        }
        _ => return Err(usage("rate [value]")),
    }
    cli_io::print_info(format!(
        "1 {} = {} {}",
        Currency::Usd,
        format_number(context.store.settings().rate, 2),
        Currency::Php
    ));
    Ok(())
}

fn cmd_display(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {}
        [raw] => {
            let currency = parse_currency(raw)?;
            context.store.set_display_currency(currency)?;
        }
        _ => return Err(usage("display [USD|PHP]")),
    }
    cli_io::print_info(format!(
        "Display currency: {}",
        context.store.settings().display_currency
    ));
    Ok(())
}

fn cmd_theme(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let theme = match args {
        [] => context.store.settings().theme,
        ["toggle"] => context.store.toggle_theme()?,
        [raw] => {
            let theme: Theme = raw.parse()?;
            context.store.set_theme(theme)?;
            theme
        }
        _ => return Err(usage("theme [light|dark|toggle]")),
    };
    context.refresh_output();
    cli_io::print_info(format!("Theme: {}", theme));
    Ok(())
}

fn cmd_reminders(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["show"] => {}
        ["set", daily, day, weekly] => {
            let schedule = ReminderSchedule {
                daily_time: daily.trim().to_string(),
                weekly_day: day.trim().to_string(),
                weekly_time: weekly.trim().to_string(),
            };
            context.store.set_reminders(schedule)?;
            cli_io::print_success("Reminder schedule updated.");
        }
        ["check"] => {
            let due = due_reminders(&context.store.settings().reminders, Local::now().naive_local())?;
            if due.is_empty() {
                cli_io::print_info("No reminders due right now.");
            }
            for kind in due {
                cli_io::print_warning(format!("{}: {}", kind.title(), kind.message()));
            }
            return Ok(());
        }
        _ => return Err(usage(REMINDERS_USAGE)),
    }
    let schedule = &context.store.settings().reminders;
    section("Reminders");
    cli_io::print_info(format!("  Daily  : {}", schedule.daily_time));
    cli_io::print_info(format!("  Weekly : {} {}", schedule.weekly_day, schedule.weekly_time));
    Ok(())
}
