use crate::errors::{AppError, AppResult};
use crate::utils::time::MAX_SPAN_HOURS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    /// Open sessions older than this are closed by the stale-session sweep.
    #[serde(default = "default_auto_checkout_after")]
    pub auto_checkout_after_hours: f64,
    /// Hours credited to a session closed by the sweep.
    #[serde(default = "default_auto_checkout_credit")]
    pub auto_checkout_credit_hours: f64,
    #[serde(default = "default_drift_tolerance")]
    pub drift_tolerance_hours: f64,
    #[serde(default = "default_categories")]
    pub default_categories: Vec<String>,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_auto_checkout_after() -> f64 {
    12.0
}
fn default_auto_checkout_credit() -> f64 {
    1.0
}
fn default_drift_tolerance() -> f64 {
    0.01
}
fn default_categories() -> Vec<String> {
    ["Work Night", "Training", "Board Meeting", "EMR Meeting", "Other"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            auto_checkout_after_hours: default_auto_checkout_after(),
            auto_checkout_credit_hours: default_auto_checkout_credit(),
            drift_tolerance_hours: default_drift_tolerance(),
            default_categories: default_categories(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory (`~/.fdms`).
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".fdms")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("fdms.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("fdms.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Write the configuration file, creating the config directory if needed.
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)
            .map_err(|e| AppError::Config(format!("cannot serialize configuration: {e}")))?;

        let mut file = fs::File::create(path)?;
        file.write_all(yaml.as_bytes())?;
        Ok(())
    }

    /// Initialize configuration and database files.
    ///
    /// A relative `custom_db` is resolved inside the config directory. With
    /// `is_test` the configuration file is left untouched.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();

        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(name);
                if p.is_absolute() {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => Self::database_file(),
        };

        let mut config = if is_test {
            Self::default()
        } else {
            Self::load()?
        };
        config.database = db_path.to_string_lossy().to_string();

        if !is_test {
            config.save_to(&Self::config_file())?;
            println!("✅ Config file: {}", Self::config_file().display());
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(config)
    }

    /// Validate the numeric knobs before they reach the ledger.
    pub fn validate(&self) -> AppResult<()> {
        let threshold = self.auto_checkout_after_hours;
        if !(threshold.is_finite() && (0.0..=MAX_SPAN_HOURS).contains(&threshold)) {
            return Err(AppError::Config(format!(
                "auto_checkout_after_hours must be between 0 and {MAX_SPAN_HOURS}, got {threshold}"
            )));
        }
        let credit = self.auto_checkout_credit_hours;
        if !(credit.is_finite() && credit > 0.0 && credit <= threshold) {
            return Err(AppError::Config(format!(
                "auto_checkout_credit_hours must be > 0 and <= auto_checkout_after_hours ({} / {})",
                self.auto_checkout_credit_hours, self.auto_checkout_after_hours
            )));
        }
        if !(self.drift_tolerance_hours.is_finite() && self.drift_tolerance_hours >= 0.0) {
            return Err(AppError::Config(
                "drift_tolerance_hours must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: Config = serde_yaml::from_str("database: /tmp/x.sqlite\n").unwrap();
        assert_eq!(cfg.database, "/tmp/x.sqlite");
        assert_eq!(cfg.auto_checkout_after_hours, 12.0);
        assert_eq!(cfg.auto_checkout_credit_hours, 1.0);
        assert_eq!(cfg.default_categories.len(), 5);
        cfg.validate().unwrap();
    }

    #[test]
    fn credit_larger_than_threshold_is_rejected() {
        let cfg = Config {
            auto_checkout_after_hours: 2.0,
            auto_checkout_credit_hours: 3.0,
            ..Config::default()
        };
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn non_finite_or_oversized_knobs_are_rejected() {
        for (after, credit) in [(f64::NAN, 1.0), (12.0, f64::NAN), (1e300, 1.0), (-1.0, 1.0)] {
            let cfg = Config {
                auto_checkout_after_hours: after,
                auto_checkout_credit_hours: credit,
                ..Config::default()
            };
            assert!(
                matches!(cfg.validate(), Err(AppError::Config(_))),
                "after={after} credit={credit}"
            );
        }
    }
}
