//! Application configuration structures.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Largest batch the queue accepts per call.
pub const MAX_BATCH_SIZE: usize = 10;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Table names
    #[serde(default)]
    pub tables: TableConfig,

    /// Follow-up queue settings
    #[serde(default)]
    pub queue: QueueConfig,

    /// HTTP fetch settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Provider to extraction theme mapping
    #[serde(default)]
    pub providers: ProviderConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.tables.series.trim().is_empty() {
            return Err(AppError::validation("tables.series is empty"));
        }
        if self.tables.chapters.trim().is_empty() {
            return Err(AppError::validation("tables.chapters is empty"));
        }
        if self.queue.batch_size == 0 || self.queue.batch_size > MAX_BATCH_SIZE {
            return Err(AppError::validation(format!(
                "queue.batch_size must be within 1..={MAX_BATCH_SIZE}"
            )));
        }
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        Ok(())
    }
}

/// Names of the backing tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default = "defaults::series_table")]
    pub series: String,

    #[serde(default = "defaults::chapters_table")]
    pub chapters: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            series: defaults::series_table(),
            chapters: defaults::chapters_table(),
        }
    }
}

/// Follow-up queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Queue URL (FIFO queue in production)
    #[serde(default)]
    pub url: String,

    /// Entries per batch submission
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// Width of the dedup time bucket in seconds (0 disables bucketing)
    #[serde(default = "defaults::dedup_window")]
    pub dedup_window_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            batch_size: defaults::batch_size(),
            dedup_window_secs: defaults::dedup_window(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Site theme whose markup an extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// MangaStream / Themesia WordPress theme
    MangaStream,
    /// Madara WordPress theme
    Madara,
}

/// Which theme each provider runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Theme for providers without an explicit entry
    #[serde(default = "defaults::default_theme")]
    pub default_theme: Option<Theme>,

    /// Explicit provider to theme assignments
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            default_theme: defaults::default_theme(),
            themes: HashMap::new(),
        }
    }
}

impl ProviderConfig {
    /// Resolve the theme for a provider.
    pub fn theme_for(&self, provider: &str) -> Option<Theme> {
        self.themes.get(provider).copied().or(self.default_theme)
    }
}

mod defaults {
    use super::Theme;

    pub fn series_table() -> String {
        "series".into()
    }
    pub fn chapters_table() -> String {
        "chapters".into()
    }
    pub fn batch_size() -> usize {
        super::MAX_BATCH_SIZE
    }
    pub fn dedup_window() -> u64 {
        60
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/41.0.2228.0 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn default_theme() -> Option<Theme> {
        Some(Theme::MangaStream)
    }
}
