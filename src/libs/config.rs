//! Configuration management for bookking.
//!
//! Settings live in `config.json` inside the per-user data directory and
//! are grouped into optional modules, each of which falls back to its
//! defaults when absent.
//!
//! ## Modules
//!
//! - **Goals**: daily and weekly page targets, monthly and yearly book targets
//! - **Timer**: how often the reading clock is redrawn
//!
//! ## File Location
//!
//! - **Windows**: `%LOCALAPPDATA%\bookking\bookking\config.json`
//! - **macOS**: `~/Library/Application Support/bookking/bookking/config.json`
//! - **Linux**: `~/.local/share/bookking/bookking/config.json`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bookking::libs::config::Config;
//!
//! let config = Config::read()?;
//! let goals = config.goals.unwrap_or_default();
//! println!("Daily target: {} pages", goals.daily_pages);
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::time::Duration;

/// Configuration file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// A module offered by the setup wizard.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

/// Reading goals.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GoalsConfig {
    /// Pages to read per calendar day.
    pub daily_pages: u64,
    /// Pages to read over the last seven days.
    pub weekly_pages: u64,
    /// Books to finish per calendar month.
    pub monthly_books: u64,
    /// Books to finish per calendar year.
    pub yearly_books: u64,
}

impl Default for GoalsConfig {
    fn default() -> Self {
        GoalsConfig {
            daily_pages: 20,
            weekly_pages: 140,
            monthly_books: 2,
            yearly_books: 24,
        }
    }
}

/// Reading clock settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TimerConfig {
    /// Redraw period of the running clock in milliseconds.
    ///
    /// Only affects display; elapsed time is always recomputed from the
    /// stored start instant.
    pub refresh_interval_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        TimerConfig { refresh_interval_ms: 1000 }
    }
}

impl TimerConfig {
    /// The refresh period, never shorter than 100ms.
    pub fn refresh_period(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(100))
    }
}

/// Root configuration object.
///
/// Unconfigured modules are `None` and omitted from the JSON output.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<GoalsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerConfig>,
}

impl Config {
    /// Reads the configuration from the default data directory.
    ///
    /// A missing file yields [`Config::default`]; a file that exists but
    /// does not parse is an error.
    pub fn read() -> Result<Config> {
        Self::read_from(&DataStorage::new())
    }

    /// Reads the configuration from `storage`.
    pub fn read_from(storage: &DataStorage) -> Result<Config> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Writes the configuration as pretty JSON to the default data directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&DataStorage::new())
    }

    pub fn save_to(&self, storage: &DataStorage) -> Result<()> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    pub fn goals(&self) -> GoalsConfig {
        self.goals.clone().unwrap_or_default()
    }

    pub fn timer(&self) -> TimerConfig {
        self.timer.clone().unwrap_or_default()
    }

    /// Runs the interactive setup wizard.
    ///
    /// Starts from the current configuration, lets the user pick which
    /// modules to edit and prompts for each value with the current one as
    /// default.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be used for prompts.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![
            ConfigModule {
                key: "goals".to_string(),
                name: "Goals".to_string(),
            },
            ConfigModule {
                key: "timer".to_string(),
                name: "Timer".to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "goals" => {
                    let default = config.goals();
                    msg_print!(Message::ConfigModuleGoals);
                    config.goals = Some(GoalsConfig {
                        daily_pages: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptDailyPages.to_string())
                            .default(default.daily_pages)
                            .interact_text()?,
                        weekly_pages: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptWeeklyPages.to_string())
                            .default(default.weekly_pages)
                            .interact_text()?,
                        monthly_books: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptMonthlyBooks.to_string())
                            .default(default.monthly_books)
                            .interact_text()?,
                        yearly_books: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptYearlyBooks.to_string())
                            .default(default.yearly_books)
                            .interact_text()?,
                    });
                }
                "timer" => {
                    let default = config.timer();
                    msg_print!(Message::ConfigModuleTimer);
                    config.timer = Some(TimerConfig {
                        refresh_interval_ms: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptRefreshInterval.to_string())
                            .default(default.refresh_interval_ms)
                            .interact_text()?,
                    });
                }
                _ => {}
            }
        }

        Ok(config)
    }
}
