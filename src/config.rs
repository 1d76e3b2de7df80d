//! qrprofile runtime configuration handling

use crate::error::{Error, Result};
use crate::labels::{LabelOverrides, Labels, Locale};
use crate::pipeline::ExportSize;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration structure loaded from disk or environment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileQrConfig {
    /// Export defaults
    pub export: ExportOptions,
    /// Language of labels and alerts
    pub locale: LocaleOptions,
    /// Logging configuration
    pub logging: LoggingOptions,
}

impl ProfileQrConfig {
    /// Load configuration from an explicit path or fall back to discovered defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = explicit_path {
            Self::from_file(path)?
        } else if let Some(path) = Self::discover_file()? {
            tracing::info!("Using configuration file: {}", path.display());
            Self::from_file(&path)?
        } else {
            tracing::debug!("No qrprofile.toml / qrprofile.yaml found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Attempt to locate a configuration file in common locations.
    fn discover_file() -> Result<Option<PathBuf>> {
        let cwd =
            env::current_dir().map_err(|e| Error::Config(format!("Failed to read cwd: {e}")))?;
        for candidate in ["qrprofile.toml", "qrprofile.yaml", "qrprofile.yml"] {
            let path = cwd.join(candidate);
            if path.exists() {
                return Ok(Some(path));
            }
        }

        if let Some(xdg_config) = env::var_os("XDG_CONFIG_HOME") {
            let base = PathBuf::from(xdg_config).join("qrprofile");
            for candidate in ["config.toml", "config.yaml"] {
                let path = base.join(candidate);
                if path.exists() {
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }

    /// Read configuration from a concrete file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
            .as_str()
        {
            "toml" => Self::from_toml(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse TOML {}: {e}", path.display()))
            }),
            "yaml" | "yml" => Self::from_yaml(&contents).map_err(|e| {
                Error::Config(format!("Failed to parse YAML {}: {e}", path.display()))
            }),
            other => Err(Error::Config(format!(
                "Unsupported config format '{}', expected toml/yaml",
                other
            ))),
        }
    }

    /// Parse TOML text
    pub fn from_toml(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Parse YAML text
    pub fn from_yaml(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    /// Apply environment variable overrides after file/default loading.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from any `QRPROFILE_*` key lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        self.export.apply_overrides(&lookup);
        self.locale.apply_overrides(&lookup);
        self.logging.apply_overrides(&lookup);
    }

    /// Label set after applying the locale and per-label overrides
    pub fn labels(&self) -> Labels {
        self.locale.labels()
    }
}

/// Export defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Size selected when the pipeline starts
    pub size: ExportSize,
    /// Directory exported files are saved into
    pub output_dir: PathBuf,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            size: ExportSize::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl ExportOptions {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(size) = lookup("QRPROFILE_EXPORT_SIZE") {
            match size.parse::<ExportSize>() {
                Ok(parsed) => self.size = parsed,
                Err(err) => tracing::warn!("Ignoring QRPROFILE_EXPORT_SIZE: {err}"),
            }
        }
        if let Some(dir) = lookup("QRPROFILE_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
    }
}

/// Locale selection plus per-label overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleOptions {
    /// Built-in label set
    pub language: Locale,
    /// Individual label replacements
    pub labels: LabelOverrides,
}

impl LocaleOptions {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(locale) = lookup("QRPROFILE_LOCALE") {
            match locale.parse::<Locale>() {
                Ok(parsed) => self.language = parsed,
                Err(err) => tracing::warn!("Ignoring QRPROFILE_LOCALE: {err}"),
            }
        }
    }

    /// Resolved label set
    pub fn labels(&self) -> Labels {
        let mut labels = self.language.labels();
        self.labels.apply(&mut labels);
        labels
    }
}

/// Structured logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default log level (overridable via `QRPROFILE_LOG_LEVEL`)
    pub level: String,
    /// Optional log file path for teeing structured logs
    pub file: Option<PathBuf>,
    /// Force ANSI colors in stderr logging
    pub color: bool,
    /// Optional log rotation strategy applied to `file`
    pub rotation: Option<LogRotation>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            color: true,
            rotation: None,
        }
    }
}

impl LoggingOptions {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("QRPROFILE_LOG_LEVEL") {
            self.level = level;
        }
        if let Some(file) = lookup("QRPROFILE_LOG_FILE") {
            self.file = Some(PathBuf::from(file));
        }
        if let Some(color) = lookup("QRPROFILE_LOG_COLOR") {
            match color.to_ascii_lowercase().as_str() {
                "0" | "false" | "off" => self.color = false,
                "1" | "true" | "on" => self.color = true,
                _ => {}
            }
        }
        if let Some(rotation) = lookup("QRPROFILE_LOG_ROTATION") {
            if let Some(parsed) = LogRotation::parse(&rotation) {
                self.rotation = Some(parsed);
            }
        }
    }
}

/// Supported log rotation policies for file sinks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    /// Rotate log files once per hour
    Hourly,
    /// Rotate log files once per day
    Daily,
}

impl LogRotation {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}
