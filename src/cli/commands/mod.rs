pub mod budget;
pub mod data;
pub mod report;
pub mod settings;
pub mod system;
pub mod template;
pub mod transaction;

use crate::cli::core::CommandError;
use crate::cli::registry::CommandEntry;
use crate::currency::{parse_amount, Currency};

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(transaction::definitions());
    commands.extend(report::definitions());
    commands.extend(budget::definitions());
    commands.extend(template::definitions());
    commands.extend(settings::definitions());
    commands.extend(data::definitions());
    commands.extend(system::definitions());
    commands
}

/// Positional arguments plus `--name value` / `--name=value` options.
#[derive(Debug, Default)]
pub(crate) struct Args<'a> {
    positional: Vec<&'a str>,
    options: Vec<(&'a str, &'a str)>,
    switches: Vec<&'a str>,
}

impl<'a> Args<'a> {
    /// `switches` lists the options that take no value.
    pub(crate) fn parse(raw: &[&'a str], switches: &[&str]) -> Result<Self, CommandError> {
        let mut args = Args::default();
        let mut iter = raw.iter().copied();
        while let Some(token) = iter.next() {
            let Some(name) = token.strip_prefix("--") else {
                args.positional.push(token);
                continue;
            };
            if let Some((name, value)) = name.split_once('=') {
                args.options.push((name, value));
            } else if switches.contains(&name) {
                args.switches.push(name);
            } else {
                let value = iter.next().ok_or_else(|| {
                    CommandError::InvalidArguments(format!("option `--{}` needs a value", name))
                })?;
                args.options.push((name, value));
            }
        }
        Ok(args)
    }

    pub(crate) fn positional(&self, index: usize) -> Option<&'a str> {
        self.positional.get(index).copied()
    }

    pub(crate) fn positional_len(&self) -> usize {
        self.positional.len()
    }

    /// Remaining positionals from `index` joined by spaces.
    pub(crate) fn rest(&self, index: usize) -> Option<String> {
        let rest = self.positional.get(index..)?;
        (!rest.is_empty()).then(|| rest.join(" "))
    }

    pub(crate) fn option(&self, name: &str) -> Option<&'a str> {
        self.options
            .iter()
            .rev()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub(crate) fn has(&self, name: &str) -> bool {
        self.switches.contains(&name)
    }
}

pub(crate) fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {}", text))
}

pub(crate) fn parse_id(raw: &str) -> Result<u64, CommandError> {
    raw.trim().trim_start_matches('#').parse().map_err(|_| {
        CommandError::InvalidArguments(format!("`{}` is not a transaction id", raw))
    })
}

/// One-based list position as typed by the user, converted to an index.
pub(crate) fn parse_position(raw: &str) -> Result<usize, CommandError> {
    match raw.trim().parse::<usize>() {
        Ok(position) if position > 0 => Ok(position - 1),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{}` is not a list position (use 1, 2, ...)",
            raw
        ))),
    }
}

pub(crate) fn parse_money(raw: &str) -> Result<f64, CommandError> {
    parse_amount(raw).map_err(CommandError::from)
}

pub(crate) fn parse_currency(raw: &str) -> Result<Currency, CommandError> {
    raw.parse().map_err(CommandError::from)
}
