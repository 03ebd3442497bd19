use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::framing::WireFormat;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Chat endpoint URL
    pub endpoint: Option<String>,
    /// How the response body is framed ("chunked" or "ndjson")
    pub wire_format: Option<WireFormat>,
    /// Enable markdown rendering in the chat area
    pub markdown: Option<bool>,
}

/// Values given on the command line, which win over the config file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub endpoint: Option<String>,
    pub wire_format: Option<WireFormat>,
    pub no_markdown: bool,
}

/// The settings a chat actually runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub endpoint: String,
    pub wire_format: WireFormat,
    pub markdown: bool,
}

/// Keys accepted by `llamabot set` and `llamabot unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Endpoint,
    WireFormat,
    Markdown,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [ConfigKey::Endpoint, ConfigKey::WireFormat, ConfigKey::Markdown];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Endpoint => "endpoint",
            ConfigKey::WireFormat => "wire-format",
            ConfigKey::Markdown => "markdown",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "endpoint" => Some(ConfigKey::Endpoint),
            "wire-format" => Some(ConfigKey::WireFormat),
            "markdown" => Some(ConfigKey::Markdown),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected `set`/`unset` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingError {
    UnknownKey(String),
    InvalidValue { key: ConfigKey, message: String },
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => {
                let known: Vec<&str> = ConfigKey::ALL.iter().map(|k| k.as_str()).collect();
                write!(f, "Unknown config key '{key}'. Known keys: {}", known.join(", "))
            }
            SettingError::InvalidValue { key, message } => {
                write!(f, "Invalid value for {key}: {message}")
            }
        }
    }
}

impl std::error::Error for SettingError {}

impl Config {
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<ConfigKey, SettingError> {
        let key = ConfigKey::parse(key).ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;
        match key {
            ConfigKey::Endpoint => {
                let value = value.trim();
                if value.is_empty() {
                    return Err(SettingError::InvalidValue {
                        key,
                        message: "endpoint cannot be empty".to_string(),
                    });
                }
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(SettingError::InvalidValue {
                        key,
                        message: format!("'{value}' is not an http(s) URL"),
                    });
                }
                self.endpoint = Some(value.to_string());
            }
            ConfigKey::WireFormat => {
                let format = value
                    .parse::<WireFormat>()
                    .map_err(|message| SettingError::InvalidValue { key, message })?;
                self.wire_format = Some(format);
            }
            ConfigKey::Markdown => {
                self.markdown = Some(parse_bool(value).ok_or_else(|| SettingError::InvalidValue {
                    key,
                    message: format!("expected on/off, got '{value}'"),
                })?);
            }
        }
        Ok(key)
    }

    pub fn unset_value(&mut self, key: &str) -> Result<ConfigKey, SettingError> {
        let key = ConfigKey::parse(key).ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;
        match key {
            ConfigKey::Endpoint => self.endpoint = None,
            ConfigKey::WireFormat => self.wire_format = None,
            ConfigKey::Markdown => self.markdown = None,
        }
        Ok(key)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
