//! Application configuration.
//!
//! Settings live in `config.json` inside the platform data directory resolved
//! by [`DataStorage`]. Every section is optional; a missing file or section
//! falls back to defaults so the tool runs without any setup.
//!
//! ## Sections
//!
//! - **database**: path override for the SQLite file
//! - **pagination**: default and maximum page size
//! - **display_timezone**: fixed offset used to present audit timestamps
//! - **export**: output directory and job expiry
//!
//! ```rust,no_run
//! use datamanage::libs::config::Config;
//!
//! let mut config = Config::read()?;
//! config.display_timezone = Some("+07:00".into());
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use super::manager::{DEFAULT_MAX_PER_PAGE, DEFAULT_PER_PAGE};
use super::resource::parse_offset;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_EXPIRES_AFTER_DAYS: u32 = 7;

/// A section offered by the setup wizard.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct DatabaseConfig {
    /// SQLite file; the data directory default is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PaginationConfig {
    /// Page size used when a request does not name one.
    pub per_page: u32,
    /// Upper bound applied to requested page sizes.
    pub max_per_page: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            max_per_page: DEFAULT_MAX_PER_PAGE,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ExportConfig {
    /// Directory export files are written to; the data directory when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Days after which a completed export job is considered expired.
    pub expires_after_days: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            expires_after_days: DEFAULT_EXPIRES_AFTER_DAYS,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationConfig>,

    /// Fixed UTC offset such as `+07:00`. Timestamps stay in UTC when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_timezone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportConfig>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        DataStorage::new().get_path(CONFIG_FILE_NAME)
    }

    /// Loads the configuration, or defaults when no file exists yet.
    pub fn read() -> Result<Config> {
        Self::read_from(&Self::path()?)
    }

    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    pub fn export_settings(&self) -> ExportConfig {
        self.export.clone().unwrap_or_default()
    }

    /// Interactive setup. Existing values are offered as defaults.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = [
            ConfigModule {
                key: "database".to_string(),
                name: "Database".to_string(),
            },
            ConfigModule {
                key: "pagination".to_string(),
                name: "Pagination".to_string(),
            },
            ConfigModule {
                key: "display".to_string(),
                name: "Display timezone".to_string(),
            },
            ConfigModule {
                key: "export".to_string(),
                name: "Export".to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "database" => {
                    let default = config.database.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleDatabase);
                    let path: String = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptDatabasePath.to_string())
                        .default(default.path.unwrap_or_default())
                        .allow_empty(true)
                        .interact_text()?;
                    config.database = Some(DatabaseConfig {
                        path: (!path.trim().is_empty()).then(|| path.trim().to_string()),
                    });
                }
                "pagination" => {
                    let default = config.pagination.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModulePagination);
                    let max_per_page: u32 = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptMaxPerPage.to_string())
                        .default(default.max_per_page)
                        .validate_with(|value: &u32| if *value > 0 { Ok(()) } else { Err(Message::PageSizeMustBePositive.to_string()) })
                        .interact_text()?;
                    let per_page: u32 = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptPerPage.to_string())
                        .default(default.per_page.min(max_per_page))
                        .validate_with(|value: &u32| {
                            if *value > 0 && *value <= max_per_page {
                                Ok(())
                            } else {
                                Err(Message::PageSizeOutOfRange(max_per_page).to_string())
                            }
                        })
                        .interact_text()?;
                    config.pagination = Some(PaginationConfig { per_page, max_per_page });
                }
                "display" => {
                    msg_print!(Message::ConfigModuleDisplay);
                    let offset: String = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptDisplayTimezone.to_string())
                        .default(config.display_timezone.clone().unwrap_or_else(|| "+00:00".to_string()))
                        .validate_with(|value: &String| match parse_offset(value) {
                            Some(_) => Ok(()),
                            None => Err(Message::InvalidTimezone(value.clone()).to_string()),
                        })
                        .interact_text()?;
                    config.display_timezone = parse_offset(&offset).map(|offset| offset.to_string());
                }
                "export" => {
                    let default = config.export_settings();
                    msg_print!(Message::ConfigModuleExport);
                    let output_dir: String = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptExportDir.to_string())
                        .default(default.output_dir.unwrap_or_default())
                        .allow_empty(true)
                        .interact_text()?;
                    let expires_after_days: u32 = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptExpiresAfterDays.to_string())
                        .default(default.expires_after_days)
                        .interact_text()?;
                    config.export = Some(ExportConfig {
                        output_dir: (!output_dir.trim().is_empty()).then(|| output_dir.trim().to_string()),
                        expires_after_days,
                    });
                }
                _ => {}
            }
        }

        Ok(config)
    }
}
