use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HORIZON_MONTHS: u32 = 6;
pub const DEFAULT_FRESHNESS_HOURS: i64 = 24;
/// Ten years; anything longer is a typo, not a window.
pub const MAX_FRESHNESS_HOURS: i64 = 24 * 366 * 10;
pub const DEFAULT_REFRESH_HOURS: u64 = 12;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Read { path: String, message: String },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: String, message: String },
    #[error("invalid value {value:?} for {name}")]
    InvalidVar { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Falls back to the per-user data directory when unset.
    pub database_path: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    /// How far ahead the listing reaches; `0` disables the bound.
    pub horizon_months: u32,
    pub freshness_hours: i64,
    /// Period of the background collection pass; `0` turns it off.
    pub refresh_hours: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            horizon_months: DEFAULT_HORIZON_MONTHS,
            freshness_hours: DEFAULT_FRESHNESS_HOURS,
            refresh_hours: DEFAULT_REFRESH_HOURS,
        }
    }
}

impl AppConfig {
    /// `config.json` from the data directory, then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = read_config(&utils::config_path())?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("EVENTS_DB_PATH").filter(|v| !v.trim().is_empty()) {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(host) = lookup("HOST").filter(|v| !v.trim().is_empty()) {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = parse_var("PORT", &port)?;
        }
        if let Some(months) = lookup("EVENTS_HORIZON_MONTHS") {
            self.horizon_months = parse_var("EVENTS_HORIZON_MONTHS", &months)?;
        }
        if let Some(hours) = lookup("EVENTS_FRESHNESS_HOURS") {
            self.freshness_hours = parse_var("EVENTS_FRESHNESS_HOURS", &hours)?;
        }
        if let Some(hours) = lookup("EVENTS_REFRESH_HOURS") {
            self.refresh_hours = parse_var("EVENTS_REFRESH_HOURS", &hours)?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=MAX_FRESHNESS_HOURS).contains(&self.freshness_hours) {
            return Err(ConfigError::InvalidVar {
                name: "freshness_hours",
                value: self.freshness_hours.to_string(),
            });
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(utils::database_path)
    }

    pub fn horizon(&self) -> Option<u32> {
        (self.horizon_months > 0).then_some(self.horizon_months)
    }

    pub fn freshness_window(&self) -> chrono::Duration {
        chrono::Duration::hours(self.freshness_hours.clamp(0, MAX_FRESHNESS_HOURS))
    }

    pub fn refresh_period(&self) -> Option<std::time::Duration> {
        (self.refresh_hours > 0)
            .then(|| std::time::Duration::from_secs(self.refresh_hours.saturating_mul(3600)))
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidVar {
        name,
        value: value.to_string(),
    })
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|err| ConfigError::Read {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    serde_json::from_str(&contents).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(lookup_from(&[
                ("PORT", "8080"),
                ("EVENTS_DB_PATH", "/tmp/events.sqlite"),
                ("EVENTS_HORIZON_MONTHS", "0"),
            ]))
            .expect("valid overrides");

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/events.sqlite"));
        assert_eq!(config.horizon(), None);
        assert_eq!(config.freshness_window(), chrono::Duration::hours(24));
    }

    #[test]
    fn rejects_malformed_numbers() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup_from(&[("PORT", "eighty")]))
            .expect_err("bad port");
        assert!(matches!(err, ConfigError::InvalidVar { name: "PORT", .. }));
    }

    #[test]
    fn rejects_out_of_range_freshness_window() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup_from(&[("EVENTS_FRESHNESS_HOURS", "3000000000")]))
            .expect_err("window too long");
        assert!(matches!(
            err,
            ConfigError::InvalidVar {
                name: "freshness_hours",
                ..
            }
        ));

        let from_file = AppConfig {
            freshness_hours: 3_000_000_000_000,
            ..AppConfig::default()
        };
        assert!(from_file.validate().is_err());
        assert_eq!(
            from_file.freshness_window(),
            chrono::Duration::hours(MAX_FRESHNESS_HOURS)
        );
    }

    #[test]
    fn refresh_period_defaults_to_twice_daily_and_zero_disables() {
        let mut config = AppConfig::default();
        assert_eq!(
            config.refresh_period(),
            Some(std::time::Duration::from_secs(12 * 3600))
        );
        config
            .apply_overrides(lookup_from(&[("EVENTS_REFRESH_HOURS", "0")]))
            .expect("valid override");
        assert_eq!(config.refresh_period(), None);
    }

    #[test]
    fn partial_config_files_keep_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "port": 9000 }"#).expect("write config");

        let config = read_config(&path).expect("read config");
        assert_eq!(config.port, 9000);
        assert_eq!(config.horizon_months, DEFAULT_HORIZON_MONTHS);

        let missing = read_config(&dir.path().join("absent.json")).expect("missing file");
        assert_eq!(missing, AppConfig::default());
    }
}
