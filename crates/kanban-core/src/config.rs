use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

pub const DEFAULT_COLUMN_COLOR: &str = "#D6E8FF";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How long a loaded board may be served from cache, in seconds.
    pub cache_ttl_secs: u64,
    pub retry: RetryConfig,
    pub default_board_title: String,
    pub default_columns: Vec<String>,
    pub default_column_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 30,
            retry: RetryConfig::default(),
            default_board_title: "My Kanban".to_string(),
            default_columns: vec!["To Do".to_string(), "Doing".to_string(), "Done".to_string()],
            default_column_color: DEFAULT_COLUMN_COLOR.to_string(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 10_000,
            jitter_ms: 1_000,
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/kanban/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("kanban/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("kanban\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                if let Ok(content) = std::fs::read_to_string(&config_path) {
                    match toml::from_str(&content) {
                        Ok(config) => return config,
                        Err(e) => tracing::warn!(
                            "Ignoring invalid config at {}: {}",
                            config_path.display(),
                            e
                        ),
                    }
                }
            }
        }
        Self::default()
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            base_delay: Duration::from_millis(self.retry.base_delay_ms),
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
            jitter: Duration::from_millis(self.retry.jitter_ms),
        }
    }
}
