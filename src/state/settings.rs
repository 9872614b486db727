//! Persisted user settings and their storage backends

use std::{
    fs,
    path::PathBuf,
    sync::Mutex,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::timer_state::{DEFAULT_MINUTES, MAX_MINUTES, MIN_MINUTES};

/// Errors raised while reading or writing the settings record
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("settings store unavailable: {0}")]
    Unavailable(String),
}

/// Colour scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

impl Theme {
    /// Next theme in the auto -> dark -> light -> auto cycle
    pub fn next(self) -> Self {
        match self {
            Theme::Auto => Theme::Dark,
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Auto,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Auto => "Auto",
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "auto" => Some(Theme::Auto),
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// The flat settings record shared by the engine and the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub muted: bool,
    pub theme: Theme,
    pub last_minutes: u32,
    pub notifications_enabled: bool,
}

impl Settings {
    /// Decode a stored record.
    ///
    /// Each field is read on its own; a missing or malformed field keeps its
    /// default while the rest of the record still applies. Unparseable input
    /// yields the defaults.
    pub fn from_json_lenient(raw: &str) -> Self {
        let mut settings = Settings::default();

        let parsed: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                debug!("Discarding unreadable settings record: {}", e);
                return settings;
            }
        };

        if let Some(muted) = parsed.get("muted").and_then(Value::as_bool) {
            settings.muted = muted;
        }
        if let Some(theme) = parsed.get("theme").and_then(Value::as_str).and_then(Theme::parse) {
            settings.theme = theme;
        }
        if let Some(minutes) = parsed.get("lastMinutes").and_then(Value::as_f64) {
            if minutes.is_finite() {
                settings.last_minutes = minutes
                    .round()
                    .clamp(f64::from(MIN_MINUTES), f64::from(MAX_MINUTES))
                    as u32;
            }
        }
        if let Some(enabled) = parsed.get("notificationsEnabled").and_then(Value::as_bool) {
            settings.notifications_enabled = enabled;
        }

        settings
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muted: false,
            theme: Theme::Auto,
            last_minutes: DEFAULT_MINUTES,
            notifications_enabled: true,
        }
    }
}

/// Raw storage for the serialized settings record under a single key
pub trait SettingsStore: Send + Sync {
    /// Read the stored record, `None` if nothing has been saved yet
    fn read_raw(&self) -> Result<Option<String>, SettingsError>;

    fn write_raw(&self, raw: &str) -> Result<(), SettingsError>;
}

/// Settings persisted as a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `<config dir>/chime-timer/settings.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chime-timer")
            .join("settings.json")
    }

    fn io_error(&self, source: std::io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsStore for JsonFileStore {
    fn read_raw(&self) -> Result<Option<String>, SettingsError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write_raw(&self, raw: &str) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, raw).map_err(|e| self.io_error(e))
    }
}

/// In-process store, used when no file should be touched
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `raw`
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn read_raw(&self) -> Result<Option<String>, SettingsError> {
        self.raw
            .lock()
            .map(|raw| raw.clone())
            .map_err(|e| SettingsError::Unavailable(e.to_string()))
    }

    fn write_raw(&self, raw: &str) -> Result<(), SettingsError> {
        let mut slot = self
            .raw
            .lock()
            .map_err(|e| SettingsError::Unavailable(e.to_string()))?;
        *slot = Some(raw.to_string());
        Ok(())
    }
}
