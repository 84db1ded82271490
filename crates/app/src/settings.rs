//! Settings for the `kakebo` binary.
//!
//! Values come from an optional TOML file (`settings.toml` unless `--config`
//! names another one), then from `KAKEBO_*` environment variables, then from
//! the command-line flags.

use std::path::PathBuf;

use config::{Config, Environment, File};
use engine::Locale;
use serde::Deserialize;

use crate::{
    cli::Cli,
    error::{AppError, Result},
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level for the `kakebo` and `engine` targets.
    pub level: String,
    pub locale: String,
    pub database: Option<PathBuf>,
    pub read_only: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            locale: "es".to_string(),
            database: None,
            read_only: false,
        }
    }
}

impl Settings {
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut settings: Settings = Config::builder()
            .add_source(File::with_name(&cli.config).required(false))
            .add_source(Environment::with_prefix("KAKEBO"))
            .build()?
            .try_deserialize()?;

        if let Some(database) = &cli.database {
            settings.database = Some(database.clone());
        }
        if cli.read_only {
            settings.read_only = true;
        }
        if let Some(locale) = &cli.locale {
            settings.locale = locale.clone();
        }

        Ok(settings)
    }

    pub fn locale(&self) -> Result<Locale> {
        Locale::try_from(self.locale.as_str()).map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.level, "warn");
        assert_eq!(settings.locale().unwrap(), Locale::Es);
        assert!(!settings.read_only);
    }

    #[test]
    fn unknown_locale_is_rejected() {
        let settings = Settings {
            locale: "fr".to_string(),
            ..Settings::default()
        };
        assert!(settings.locale().is_err());
    }
}
