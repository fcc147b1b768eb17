use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// User configuration as stored in `config.toml`.
///
/// Every field is optional; unset fields resolve to the defaults in
/// [`super::defaults`].
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the durable substrate (the saved chatbots)
    pub data_dir: Option<PathBuf>,
    /// Directory holding the session substrate (temporary chatbot, session id)
    pub session_dir: Option<PathBuf>,
    /// Base URL of the tutoring chat service
    pub api_base_url: Option<String>,
    /// Upper bound in bytes for any single stored value
    pub storage_quota_bytes: Option<usize>,
    pub request_timeout_secs: Option<u64>,
}

/// Keys accepted by `schoolmate config set` and `schoolmate config unset`.
pub const CONFIG_KEYS: [&str; 5] = [
    "data-dir",
    "session-dir",
    "api-base-url",
    "storage-quota-bytes",
    "request-timeout-secs",
];

/// A rejected `config set`/`config unset` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValueError {
    UnknownKey(String),
    InvalidNumber { key: String, value: String },
    Empty { key: String },
}

impl fmt::Display for ConfigValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValueError::UnknownKey(key) => write!(
                f,
                "Unknown config key: {key} (expected one of: {})",
                CONFIG_KEYS.join(", ")
            ),
            ConfigValueError::InvalidNumber { key, value } => {
                write!(f, "{key} expects a whole number, got '{value}'")
            }
            ConfigValueError::Empty { key } => write!(f, "{key} cannot be empty"),
        }
    }
}

impl std::error::Error for ConfigValueError {}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigValueError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigValueError::InvalidNumber {
            key: key.to_string(),
            value: value.to_string(),
        })
}

impl Config {
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigValueError> {
        if value.trim().is_empty() {
            return Err(ConfigValueError::Empty {
                key: key.to_string(),
            });
        }
        match key {
            "data-dir" => self.data_dir = Some(PathBuf::from(value)),
            "session-dir" => self.session_dir = Some(PathBuf::from(value)),
            "api-base-url" => self.api_base_url = Some(value.trim().to_string()),
            "storage-quota-bytes" => self.storage_quota_bytes = Some(parse_number(key, value)?),
            "request-timeout-secs" => self.request_timeout_secs = Some(parse_number(key, value)?),
            _ => return Err(ConfigValueError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), ConfigValueError> {
        match key {
            "data-dir" => self.data_dir = None,
            "session-dir" => self.session_dir = None,
            "api-base-url" => self.api_base_url = None,
            "storage-quota-bytes" => self.storage_quota_bytes = None,
            "request-timeout-secs" => self.request_timeout_secs = None,
            _ => return Err(ConfigValueError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.local/share/schoolmate` → `~/.local/share/schoolmate`
/// - macOS: `/Users/user/Library/Application Support/...` → `~/Library/Application Support/...`
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
