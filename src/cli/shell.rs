use std::{
    fmt,
    io::{self, BufRead, Lines, StdinLock},
};

use chrono::Local;
use rustyline::{error::ReadlineError, history::DefaultHistory, Cmd, Editor, KeyEvent};
use shell_words::split;
use tracing::{debug, warn};

use crate::cli::completion::LedgerCompleter;
use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::io as cli_io;
use crate::cli::output::info as output_info;
use crate::config::Settings;
use crate::currency::format_number;

/// Set to run commands from stdin without prompts or confirmations.
pub const SCRIPT_ENV: &str = "BUDGET_LEDGER_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    let mut source: Box<dyn LineSource> = match mode {
        CliMode::Interactive => Box::new(EditorLines::open(&context)?),
        CliMode::Script => Box::new(ScriptLines::stdin()),
    };
    drive(&mut context, source.as_mut())
}

/// Supplies the next command line; `None` ends the session.
trait LineSource {
    fn next_line(&mut self, context: &mut ShellContext) -> Result<Option<String>, CliError>;
}

fn drive(context: &mut ShellContext, source: &mut dyn LineSource) -> Result<(), CliError> {
    while context.running {
        let Some(line) = source.next_line(context)? else {
            break;
        };
        match handle_line(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

/// Line editor with history and ledger-aware completion. Due reminders are
/// announced before each prompt.
struct EditorLines {
    editor: Editor<LedgerCompleter, DefaultHistory>,
}

impl EditorLines {
    fn open(context: &ShellContext) -> Result<Self, CliError> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(LedgerCompleter::new(context.command_names())));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
        output_info(welcome(context.store.settings()));
        Ok(Self { editor })
    }
}

impl LineSource for EditorLines {
    fn next_line(&mut self, context: &mut ShellContext) -> Result<Option<String>, CliError> {
        loop {
            announce_due_reminders(context);
            match self.editor.readline(&prompt(context.store.settings())) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    self.editor.add_history_entry(trimmed).ok();
                    return Ok(Some(trimmed.to_string()));
                }
                Err(ReadlineError::Interrupted) => {
                    if context.confirm_exit()? {
                        return Ok(None);
                    }
                }
                Err(ReadlineError::Eof) => {
                    output_info("Exiting shell.");
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// One command per stdin line. Blank lines and `#` comments are skipped.
struct ScriptLines {
    lines: Lines<StdinLock<'static>>,
}

impl ScriptLines {
    fn stdin() -> Self {
        Self {
            lines: io::stdin().lock().lines(),
        }
    }
}

impl LineSource for ScriptLines {
    fn next_line(&mut self, _context: &mut ShellContext) -> Result<Option<String>, CliError> {
        for line in self.lines.by_ref() {
            let line = line?;
            if let Some(command) = script_command(&line) {
                return Ok(Some(command.to_string()));
            }
        }
        Ok(None)
    }
}

fn script_command(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    (!trimmed.is_empty() && !trimmed.starts_with('#')).then_some(trimmed)
}

/// `ledger [USD]> `, or `ledger [PHP @ 58.00]> ` while amounts display converted.
pub(crate) fn prompt(settings: &Settings) -> String {
    if settings.display_currency == settings.base_currency {
        format!("ledger [{}]> ", settings.display_currency)
    } else {
        format!(
            "ledger [{} @ {}]> ",
            settings.display_currency,
            format_number(settings.rate, 2)
        )
    }
}

fn welcome(settings: &Settings) -> String {
    format!(
        "Budget ledger shell. Amounts stored in {} at rate {}. Type `help` for commands.",
        settings.base_currency,
        format_number(settings.rate, 2)
    )
}

fn announce_due_reminders(context: &mut ShellContext) {
    let now = Local::now().naive_local();
    match context.reminders.poll(&context.store.settings().reminders, now) {
        Ok(due) => {
            for kind in due {
                cli_io::print_warning(format!("{}: {}", kind.title(), kind.message()));
            }
        }
        Err(err) => warn!("reminder check skipped: {}", err),
    }
}

pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let tokens = match parse_command_line(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            cli_io::print_warning(&err);
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let command = raw.to_lowercase();
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    debug!(command = %command, args = args.len(), "dispatching");
    let control = context.dispatch(&command, raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
