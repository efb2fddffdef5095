//! Process-wide settings persisted inside the ledger document, plus the
//! on-disk locations the CLI uses.

use std::{env, fmt, path::PathBuf, str::FromStr};

use dirs::home_dir;
use serde::{Deserialize, Serialize};

use crate::{
    currency::{Currency, CurrencyConverter, DEFAULT_RATE},
    errors::LedgerError,
    reminder::ReminderSchedule,
};

const DEFAULT_DIR_NAME: &str = ".budget_ledger";
const DATA_FILE: &str = "data.json";
const HOME_ENV: &str = "BUDGET_LEDGER_HOME";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(LedgerError::InvalidInput(format!(
                "unknown theme `{}` (expected light or dark)",
                other
            ))),
        }
    }
}

/// User preferences stored alongside the ledger. Mutated only through
/// [`crate::core::ledger_store::LedgerStore`] setters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub base_currency: Currency,
    #[serde(default)]
    pub display_currency: Currency,
    #[serde(default = "Settings::default_rate", alias = "php_rate")]
    pub rate: f64,
    #[serde(default)]
    pub theme: Theme,
    #[serde(flatten)]
    pub reminders: ReminderSchedule,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_currency: Currency::Usd,
            display_currency: Currency::Usd,
            rate: DEFAULT_RATE,
            theme: Theme::default(),
            reminders: ReminderSchedule::default(),
        }
    }
}

impl Settings {
    fn default_rate() -> f64 {
        DEFAULT_RATE
    }

    pub fn converter(&self) -> CurrencyConverter {
        CurrencyConverter {
            base: self.base_currency,
            display: self.display_currency,
            rate: self.rate,
        }
    }

    /// Repairs values a hand-edited file may carry. Returns a note per fix.
    pub(crate) fn sanitize(&mut self) -> Vec<String> {
        let mut notes = Vec::new();
        if self.base_currency != Currency::Usd {
            notes.push(format!(
                "base currency {} is not supported; using USD",
                self.base_currency
            ));
            self.base_currency = Currency::Usd;
        }
        if !(self.rate.is_finite() && self.rate > 0.0) {
            notes.push(format!("invalid stored rate {}; using {}", self.rate, DEFAULT_RATE));
            self.rate = DEFAULT_RATE;
        }
        notes
    }
}

/// Returns the application data directory, defaulting to `~/.budget_ledger`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Path of the single ledger document.
pub fn data_file() -> PathBuf {
    app_data_dir().join(DATA_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.reminders.daily_time, "21:00");
    }

    #[test]
    fn reads_legacy_settings_keys() {
        let raw = r#"{
            "base_currency": "USD",
            "display_currency": "PHP",
            "php_rate": 56.5,
            "theme": "dark",
            "daily_reminder_time": "20:15",
            "weekly_reminder_day": "Sat",
            "weekly_reminder_time": "09:00"
        }"#;
        let settings: Settings = serde_json::from_str(raw).unwrap();
        assert_eq!(settings.display_currency, Currency::Php);
        assert_eq!(settings.rate, 56.5);
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.reminders.weekly_day, "Sat");
        assert_eq!(settings.reminders.daily_time, "20:15");
    }

    #[test]
    fn serializes_flat_reminder_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["weekly_reminder_day"], "Sun");
        assert_eq!(json["rate"], 58.0);
        assert!(json.get("reminders").is_none());
    }

    #[test]
    fn sanitize_repairs_bad_rate() {
        let mut settings = Settings {
            rate: -1.0,
            ..Settings::default()
        };
        let notes = settings.sanitize();
        assert_eq!(notes.len(), 1);
        assert_eq!(settings.rate, DEFAULT_RATE);
    }

    #[test]
    fn theme_toggles() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
    }
}
