//! Shell context, dispatch, and CLI error types.

use std::io;

use dialoguer::theme::ColorfulTheme;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;

use crate::{
    cli::{
        commands,
        io as cli_io,
        output::{self, OutputPreferences},
        registry::{CommandEntry, CommandRegistry},
    },
    core::LedgerStore,
    errors::LedgerError,
    reminder::ReminderTracker,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

/// Errors that end the shell.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

/// Errors raised by a single command; reported and the shell keeps going.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<ReadlineError> for CliError {
    fn from(err: ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub store: LedgerStore,
    pub theme: ColorfulTheme,
    pub reminders: ReminderTracker,
    pub running: bool,
}

impl ShellContext {
    /// Opens the ledger at the default data file.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let store = LedgerStore::open_default()?;
        Ok(Self::with_store(mode, store))
    }

    pub fn with_store(mode: CliMode, store: LedgerStore) -> Self {
        let context = Self {
            mode,
            registry: CommandRegistry::new(commands::all_definitions()),
            store,
            theme: ColorfulTheme::default(),
            reminders: ReminderTracker::new(),
            running: true,
        };
        context.refresh_output();
        context
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    /// Re-applies output preferences after the theme changes.
    pub(crate) fn refresh_output(&self) {
        output::set_preferences(OutputPreferences {
            plain_mode: self.mode == CliMode::Script,
            theme: self.store.settings().theme,
        });
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        crate::cli::shell::handle_line(self, line)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = closest_command(self.registry.names(), input) {
            cli_io::print_info(format!("Suggestion: `{}`?", best));
        }
    }

    /// Asks before destructive actions. Script mode always proceeds.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true).map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(&message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Ledger(err @ LedgerError::Persistence(_)) => {
                cli_io::print_error(&err);
                cli_io::print_hint("The change is applied in memory but not saved yet.");
                Ok(())
            }
            other => {
                cli_io::print_error(&other);
                Ok(())
            }
        }
    }
}

/// Nearest registered name within edit distance 3.
pub(crate) fn closest_command<'a>(
    names: impl Iterator<Item = &'a str>,
    input: &str,
) -> Option<&'a str> {
    let needle = input.to_lowercase();
    names
        .map(|name| (levenshtein(name, &needle), name))
        .filter(|(distance, _)| *distance <= 3)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, name)| name)
}

#[cfg(test)]
pub(crate) fn process_script(lines: &[&str]) -> Result<ShellContext, CliError> {
    let store = LedgerStore::open(Box::new(crate::storage::MemoryStorage::new()))?;
    let mut context = ShellContext::with_store(CliMode::Script, store);
    for line in lines {
        match context.process_line(line)? {
            LoopControl::Continue => {}
            LoopControl::Exit => break,
        }
    }
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::ledger::TransactionKind;

    #[test]
    fn parse_line_handles_quotes() {
        let tokens = crate::cli::shell::parse_command_line("add expense 12 \"Eating Out\" lunch").unwrap();
        assert_eq!(tokens, vec!["add", "expense", "12", "Eating Out", "lunch"]);
    }

    #[test]
    fn script_adds_and_edits_transactions() {
        let context = process_script(&[
            "add income 1000 Salary \"October pay\"",
            "add expense 580 Food lunch --currency PHP",
            "edit 2 --amount 1160 --date not-a-date",
            "exit",
            "add expense 1 Ignored",
        ])
        .unwrap();
        let list = context.store.list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].kind(), TransactionKind::Income);
        assert_eq!(list[0].description(), "October pay");
        assert_eq!(list[1].entry_currency(), Currency::Php);
        assert_eq!(list[1].amount_base(), 20.0);
    }

    #[test]
    fn script_manages_budgets_and_templates() {
        let context = process_script(&[
            "display PHP",
            "budget set Food 5800",
            "template save expense 12.5 Food Coffee --currency USD --name Coffee",
            "template use 1",
            "rate 50",
        ])
        .unwrap();
        assert_eq!(context.store.budgets()["Food"], 100.0);
        assert_eq!(context.store.templates()[0].name, "Coffee");
        assert_eq!(context.store.list()[0].amount_base(), 12.5);
        assert_eq!(context.store.settings().rate, 50.0);
    }

    #[test]
    fn delete_in_script_mode_skips_confirmation() {
        let context = process_script(&["quick 5 Snacks", "delete 1", "delete 1"]).unwrap();
        assert!(context.store.list().is_empty());
    }

    #[test]
    fn bad_arguments_surface_as_command_errors() {
        let mut context = process_script(&[]).unwrap();
        let err = context.process_line("add expense lots").unwrap_err();
        assert!(matches!(err, CommandError::Ledger(LedgerError::InvalidAmount(_))));
        let err = context.process_line("rate -1").unwrap_err();
        assert!(matches!(err, CommandError::Ledger(LedgerError::InvalidRate(_))));
        assert_eq!(context.store.settings().rate, crate::currency::DEFAULT_RATE);
    }

    #[test]
    fn unknown_commands_get_suggestions() {
        let names = ["summary", "remaining", "budget"];
        assert_eq!(closest_command(names.iter().copied(), "sumary"), Some("summary"));
        assert_eq!(closest_command(names.iter().copied(), "xyzzy-plugh"), None);
    }
}
