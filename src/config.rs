// src/config.rs

//! Configuration loading for deployed environments.
//!
//! Values come from, lowest precedence first: built-in defaults, an optional
//! TOML file named by `CONFIG_PATH`, then individual environment variables.

use std::str::FromStr;

use tracing::{info, warn};

use crate::error::Result;
use crate::models::Config;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_VAR: &str = "CONFIG_PATH";

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from variables resolved by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            Some(path) => {
                info!(path = %path, "Loading config file");
                Config::load(&path)?
            }
            None => Config::default(),
        };

        if let Some(v) = lookup("SERIES_TABLE") {
            config.tables.series = v;
        }
        if let Some(v) = lookup("CHAPTERS_TABLE") {
            config.tables.chapters = v;
        }
        if let Some(v) = lookup("QUEUE_URL") {
            config.queue.url = v;
        }
        if let Some(v) = lookup("USER_AGENT") {
            config.fetch.user_agent = v;
        }
        override_parsed(&lookup, "FANOUT_BATCH_SIZE", &mut config.queue.batch_size);
        override_parsed(&lookup, "DEDUP_WINDOW_SECS", &mut config.queue.dedup_window_secs);
        override_parsed(&lookup, "FETCH_TIMEOUT_SECS", &mut config.fetch.timeout_secs);

        config.validate()?;
        Ok(config)
    }
}

fn override_parsed<F, T>(lookup: &F, name: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(name) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *target = value,
        Err(_) => warn!(var = name, value = %raw, "Ignoring unparsable environment value"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::error::AppError;
    use crate::models::Theme;

    fn lookup_in(vars: HashMap<&'static str, String>) -> impl Fn(&str) -> Option<String> {
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.tables.series, "series");
        assert_eq!(config.queue.batch_size, 10);
        assert_eq!(config.queue.dedup_window_secs, 60);
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::from_lookup(lookup_in(HashMap::from([
            ("SERIES_TABLE", "prod-series".to_string()),
            ("QUEUE_URL", "https://sqs.example/q.fifo".to_string()),
            ("FANOUT_BATCH_SIZE", "5".to_string()),
            ("DEDUP_WINDOW_SECS", "not-a-number".to_string()),
        ])))
        .unwrap();

        assert_eq!(config.tables.series, "prod-series");
        assert_eq!(config.tables.chapters, "chapters");
        assert_eq!(config.queue.url, "https://sqs.example/q.fifo");
        assert_eq!(config.queue.batch_size, 5);
        assert_eq!(config.queue.dedup_window_secs, 60);
    }

    #[test]
    fn test_invalid_batch_size_is_rejected() {
        let err = Config::from_lookup(lookup_in(HashMap::from([(
            "FANOUT_BATCH_SIZE",
            "11".to_string(),
        )])))
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_config_file_then_environment() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[tables]
series = "file-series"
chapters = "file-chapters"

[providers.themes]
reaper = "madara"
"#
        )
        .unwrap();

        let config = Config::from_lookup(lookup_in(HashMap::from([
            (CONFIG_PATH_VAR, file.path().display().to_string()),
            ("CHAPTERS_TABLE", "env-chapters".to_string()),
        ])))
        .unwrap();

        assert_eq!(config.tables.series, "file-series");
        assert_eq!(config.tables.chapters, "env-chapters");
        assert_eq!(config.providers.theme_for("reaper"), Some(Theme::Madara));
        assert_eq!(config.providers.theme_for("asura"), Some(Theme::MangaStream));
    }
}
