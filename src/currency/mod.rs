use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

/// Exchange rate used until the user sets one: PHP per 1 USD.
pub const DEFAULT_RATE: f64 = 58.0;

/// The two currencies a ledger understands. USD is the base currency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD", alias = "usd")]
    Usd,
    #[serde(rename = "PHP", alias = "php")]
    Php,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Usd, Currency::Php];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Php => "PHP",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Php => "₱",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "PHP" => Ok(Currency::Php),
            other => Err(LedgerError::InvalidInput(format!(
                "unsupported currency `{}` (expected USD or PHP)",
                other
            ))),
        }
    }
}

/// Converts amounts between the base currency and the display currency using
/// one process-wide rate (alternate-currency units per 1 base unit).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrencyConverter {
    pub base: Currency,
    pub display: Currency,
    pub rate: f64,
}

impl CurrencyConverter {
    pub fn new(base: Currency, display: Currency, rate: f64) -> Result<Self, LedgerError> {
        validate_rate(rate)?;
        Ok(Self {
            base,
            display,
            rate,
        })
    }

    /// Converts an amount typed in `currency` into the base currency. Unrounded.
    pub fn to_base(&self, amount: f64, currency: Currency) -> f64 {
        if currency == self.base {
            amount
        } else {
            amount / self.rate
        }
    }

    /// Converts a base amount into the display currency.
    pub fn from_base(&self, amount_base: f64) -> f64 {
        if self.display == self.base {
            amount_base
        } else {
            amount_base * self.rate
        }
    }

    /// Base conversion rounded to cents, the form every stored amount takes.
    pub fn to_base_rounded(&self, amount: f64, currency: Currency) -> f64 {
        round2(self.to_base(amount, currency))
    }

    pub fn symbol(&self) -> &'static str {
        self.display.symbol()
    }

    /// Renders a base amount in the display currency, e.g. `₱1,160.00`.
    pub fn format_display(&self, amount_base: f64) -> String {
        format_money(self.from_base(amount_base), self.display)
    }
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        Self {
            base: Currency::Usd,
            display: Currency::Usd,
            rate: DEFAULT_RATE,
        }
    }
}

/// Rejects rates that are not finite or not strictly positive.
pub fn validate_rate(rate: f64) -> Result<(), LedgerError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(LedgerError::InvalidRate(rate))
    }
}

/// Rounds half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Parses user-typed amounts. Surrounding whitespace and thousands commas are accepted.
pub fn parse_amount(input: &str) -> Result<f64, LedgerError> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(LedgerError::InvalidAmount(input.trim().to_string())),
    }
}

pub fn format_money(amount: f64, currency: Currency) -> String {
    let body = format_number(amount.abs(), 2);
    if amount < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}{}", currency.symbol(), body)
    } else {
        format!("{}{}", currency.symbol(), body)
    }
}

/// Formats a number with `,` thousands grouping and fixed precision.
pub fn format_number(value: f64, precision: usize) -> String {
    let body = format!("{:.*}", precision, value);
    match body.find('.') {
        Some(pos) => format!("{}{}", group_digits(&body[..pos]), &body[pos..]),
        None => group_digits(&body),
    }
}

fn group_digits(int_part: &str) -> String {
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, ',');
        }
        grouped.insert(0, ch);
    }
    format!("{}{}", sign, grouped)
}
