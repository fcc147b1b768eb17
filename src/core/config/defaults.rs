use std::path::PathBuf;
use std::time::Duration;

use crate::core::config::data::Config;
use crate::core::config::io::{project_dirs, ConfigError};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// The budget browsers give one origin's local storage.
pub const DEFAULT_STORAGE_QUOTA_BYTES: usize = 5 * 1024 * 1024;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

impl Config {
    /// Base URL of the chat service, without trailing slashes.
    pub fn api_base_url(&self) -> String {
        self.api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn storage_quota_bytes(&self) -> usize {
        self.storage_quota_bytes
            .unwrap_or(DEFAULT_STORAGE_QUOTA_BYTES)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().to_path_buf()),
        }
    }

    /// Session state is disposable, so it lives under the cache directory.
    pub fn session_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.session_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.cache_dir().join("session")),
        }
    }
}
