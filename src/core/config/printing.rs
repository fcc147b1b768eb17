use std::path::Path;

use crate::core::config::data::{path_display, Config};

fn origin(is_set: bool) -> &'static str {
    if is_set {
        ""
    } else {
        " (default)"
    }
}

impl Config {
    /// Print the effective configuration, marking values that fall back to a
    /// default.
    pub fn print_all(&self, config_path: &Path) {
        println!("Configuration file: {}", path_display(config_path));
        match self.data_dir() {
            Ok(dir) => println!(
                "  data-dir: {}{}",
                path_display(dir),
                origin(self.data_dir.is_some())
            ),
            Err(err) => println!("  data-dir: (unavailable: {err})"),
        }
        match self.session_dir() {
            Ok(dir) => println!(
                "  session-dir: {}{}",
                path_display(dir),
                origin(self.session_dir.is_some())
            ),
            Err(err) => println!("  session-dir: (unavailable: {err})"),
        }
        println!(
            "  api-base-url: {}{}",
            self.api_base_url(),
            origin(self.api_base_url.is_some())
        );
        println!(
            "  storage-quota-bytes: {}{}",
            self.storage_quota_bytes(),
            origin(self.storage_quota_bytes.is_some())
        );
        println!(
            "  request-timeout-secs: {}{}",
            self.request_timeout().as_secs(),
            origin(self.request_timeout_secs.is_some())
        );
    }
}
