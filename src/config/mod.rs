use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::core::utils::{ensure_dir, PathResolver};
use crate::errors::ConfigError;

const TMP_SUFFIX: &str = "tmp";
const DEFAULT_CURRENCY_SYMBOL: &str = "Rp";
const DEFAULT_LOCATION_TIMEOUT_SECS: u64 = 8;

/// Names accepted by [`Config::set`].
pub const SETTING_KEYS: [&str; 6] = [
    "currency_symbol",
    "location_timeout_secs",
    "default_location",
    "location_command",
    "export_dir",
    "plain_output",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub currency_symbol: String,
    pub location_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
    pub plain_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.into(),
            location_timeout_secs: DEFAULT_LOCATION_TIMEOUT_SECS,
            default_location: None,
            location_command: None,
            export_dir: None,
            plain_output: false,
        }
    }
}

impl Config {
    /// Upper bound on how long a location request may block the wizard.
    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs.max(1))
    }

    /// Export target: the configured directory, or the current one.
    pub fn resolve_export_dir(&self, cwd: &Path) -> PathBuf {
        match &self.export_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        }
    }

    /// Updates one setting from its textual form. An empty value clears
    /// optional settings.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "location_timeout_secs" => {
                self.location_timeout_secs = value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| {
                        ConfigError::InvalidSetting(format!(
                            "location_timeout_secs expects a positive whole number, got `{value}`"
                        ))
                    })?;
            }
            "default_location" => self.default_location = optional(value),
            "location_command" => self.location_command = optional(value),
            "export_dir" => self.export_dir = optional(value).map(PathBuf::from),
            "plain_output" => {
                self.plain_output = parse_flag(value).ok_or_else(|| {
                    ConfigError::InvalidSetting(format!(
                        "plain_output expects true or false, got `{value}`"
                    ))
                })?;
            }
            other => {
                return Err(ConfigError::InvalidSetting(format!(
                    "unknown key `{other}` (expected one of: {})",
                    SETTING_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Key/value pairs for display.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let unset = || "(unset)".to_string();
        vec![
            ("currency_symbol", self.currency_symbol.clone()),
            (
                "location_timeout_secs",
                self.location_timeout_secs.to_string(),
            ),
            (
                "default_location",
                self.default_location.clone().unwrap_or_else(unset),
            ),
            (
                "location_command",
                self.location_command.clone().unwrap_or_else(unset),
            ),
            (
                "export_dir",
                self.export_dir
                    .as_ref()
                    .map(|dir| dir.display().to_string())
                    .unwrap_or_else(unset),
            ),
            ("plain_output", self.plain_output.to_string()),
        ]
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
        })
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    /// Like [`ConfigManager::load`], but an unreadable file yields defaults.
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_else(|err| {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "config unreadable, using defaults"
            );
            Config::default()
        })
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
