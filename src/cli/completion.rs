//! Tab completion for the ledger shell. The first word completes to a command;
//! later words complete to what that command accepts: transaction kinds,
//! currency codes, subcommands, weekdays, or `--options` once a dash is typed.

use rustyline::{
    completion::{Completer, Pair},
    highlight::Highlighter,
    hint::Hinter,
    validate::Validator,
    Context, Helper,
};

use crate::core::services::filter_service;
use crate::currency::Currency;
use crate::reminder::WEEKDAYS;

const KINDS: &[&str] = &["income", "expense"];
const FILTER_KINDS: &[&str] = &[filter_service::ALL, "income", "expense"];
const THEMES: &[&str] = &["light", "dark", "toggle"];
const CHARTS: &[&str] = &["daily", "categories", "totals"];
const BUDGET_ACTIONS: &[&str] = &["set", "remove", "list"];
const TEMPLATE_ACTIONS: &[&str] = &["save", "list", "use", "delete"];
const REMINDER_ACTIONS: &[&str] = &["show", "set", "check"];

const ADD_OPTIONS: &[&str] = &["--currency", "--date", "--template"];
const EDIT_OPTIONS: &[&str] = &[
    "--date",
    "--type",
    "--category",
    "--description",
    "--amount",
    "--currency",
];
const FILTER_OPTIONS: &[&str] = &["--from", "--to", "--type", "--category", "--search"];
const TEMPLATE_SAVE_OPTIONS: &[&str] = &["--currency", "--name"];

/// Options that never take a value.
const SWITCHES: &[&str] = &["--template"];

pub(crate) struct LedgerCompleter {
    commands: Vec<&'static str>,
}

impl LedgerCompleter {
    pub(crate) fn new(mut commands: Vec<&'static str>) -> Self {
        commands.sort_unstable();
        commands.dedup();
        Self { commands }
    }

    /// Byte offset of the word under the cursor and the values that extend it.
    pub(crate) fn suggest(&self, prefix: &str) -> (usize, Vec<&'static str>) {
        let start = prefix
            .char_indices()
            .rev()
            .find(|(_, ch)| ch.is_whitespace())
            .map_or(0, |(idx, ch)| idx + ch.len_utf8());
        let word = &prefix[start..];
        let before: Vec<&str> = prefix[..start].split_whitespace().collect();

        let pool = match before.split_first() {
            None => self.commands.clone(),
            Some((command, args)) => {
                let command = command.to_ascii_lowercase();
                if word.starts_with('-') {
                    options_for(&command, args).to_vec()
                } else {
                    self.values_for(&command, args)
                }
            }
        };
        let needle = word.to_ascii_lowercase();
        let matches = pool
            .into_iter()
            .filter(|candidate| candidate.to_ascii_lowercase().starts_with(&needle))
            .collect();
        (start, matches)
    }

    fn values_for(&self, command: &str, args: &[&str]) -> Vec<&'static str> {
        let currencies: Vec<&'static str> = Currency::ALL.iter().map(|c| c.code()).collect();
        if let Some(option) = pending_option(args) {
            return match (command, option) {
                (_, "--currency") => currencies,
                ("filter", "--type") => FILTER_KINDS.to_vec(),
                (_, "--type") => KINDS.to_vec(),
                _ => Vec::new(),
            };
        }

        let positional = positionals(args);
        let first = positional.first().copied().unwrap_or_default();
        let values: &[&'static str] = match (command, positional.len()) {
            ("add", 0) => KINDS,
            ("budget", 0) => BUDGET_ACTIONS,
            ("budget", 3) if first == "set" => return currencies,
            ("template", 0) => TEMPLATE_ACTIONS,
            ("template", 1) if first == "save" => KINDS,
            ("display", 0) => return currencies,
            ("theme", 0) => THEMES,
            ("chart", 0) => CHARTS,
            ("reminders", 0) => REMINDER_ACTIONS,
            ("reminders", 2) if first == "set" => &WEEKDAYS,
            ("help", 0) => return self.commands.clone(),
            _ => &[],
        };
        values.to_vec()
    }
}

fn options_for(command: &str, args: &[&str]) -> &'static [&'static str] {
    match command {
        "add" => ADD_OPTIONS,
        "edit" => EDIT_OPTIONS,
        "filter" => FILTER_OPTIONS,
        "template" if args.first() == Some(&"save") => TEMPLATE_SAVE_OPTIONS,
        _ => &[],
    }
}

/// The option whose value is being typed, e.g. `--currency` in `add expense 5 --currency `.
fn pending_option<'a>(args: &[&'a str]) -> Option<&'a str> {
    let last = *args.last()?;
    (last.starts_with("--") && !last.contains('=') && !SWITCHES.contains(&last)).then_some(last)
}

/// Positional words, skipping options and the values they consume.
fn positionals<'a>(args: &[&'a str]) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut iter = args.iter().copied();
    while let Some(token) = iter.next() {
        if token.starts_with("--") {
            if !token.contains('=') && !SWITCHES.contains(&token) {
                iter.next();
            }
        } else {
            out.push(token);
        }
    }
    out
}

impl Completer for LedgerCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, values) = self.suggest(&line[..pos]);
        let pairs = values
            .into_iter()
            .map(|value| Pair {
                display: value.to_string(),
                replacement: value.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for LedgerCompleter {
    type Hint = String;
}

impl Highlighter for LedgerCompleter {}

impl Validator for LedgerCompleter {}

impl Helper for LedgerCompleter {}
