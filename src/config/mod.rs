//! Configuration management
//!
//! This module handles loading and parsing configuration for ya-apps.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session settings
    #[serde(default)]
    pub auth: AuthConfig,
    /// News site settings
    #[serde(default)]
    pub news: NewsConfig,
    /// Notes application settings
    #[serde(default)]
    pub notes: NotesConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL (`:memory:` for an in-memory database)
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum number of pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "data/ya-apps.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session lifetime in days
    #[serde(default = "default_session_days")]
    pub session_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_days: default_session_days(),
        }
    }
}

fn default_session_days() -> i64 {
    14
}

/// Accepted session lifetimes, in days
pub const SESSION_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=3650;

/// News site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Maximum number of news items on the home page
    #[serde(default = "default_count_on_home_page")]
    pub count_on_home_page: usize,
    /// Words that are not allowed anywhere in a comment
    #[serde(default = "default_bad_words")]
    pub bad_words: Vec<String>,
    /// Form error attached to the comment text when a bad word is found
    #[serde(default = "default_news_warning")]
    pub warning: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            count_on_home_page: default_count_on_home_page(),
            bad_words: default_bad_words(),
            warning: default_news_warning(),
        }
    }
}

fn default_count_on_home_page() -> usize {
    10
}

fn default_bad_words() -> Vec<String> {
    vec!["редиска".to_string(), "негодяй".to_string()]
}

fn default_news_warning() -> String {
    "Не ругайтесь!".to_string()
}

/// Notes application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesConfig {
    /// Suffix appended to a colliding slug in the form error
    #[serde(default = "default_notes_warning")]
    pub warning: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            warning: default_notes_warning(),
        }
    }
}

fn default_notes_warning() -> String {
    " - такой slug уже существует, придумайте уникальное значение!".to_string()
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - YA_APPS_SERVER_HOST
    /// - YA_APPS_SERVER_PORT
    /// - YA_APPS_DATABASE_URL
    /// - YA_APPS_DATABASE_MAX_CONNECTIONS
    /// - YA_APPS_AUTH_SESSION_DAYS
    /// - YA_APPS_NEWS_COUNT_ON_HOME_PAGE
    /// - YA_APPS_NEWS_BAD_WORDS (comma separated)
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values the application cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url must not be empty".to_string(),
            ));
        }
        if self.news.count_on_home_page == 0 {
            return Err(ConfigError::ValidationError(
                "news.count_on_home_page must be at least 1".to_string(),
            ));
        }
        if !SESSION_DAYS_RANGE.contains(&self.auth.session_days) {
            return Err(ConfigError::ValidationError(format!(
                "auth.session_days must be between {} and {}, got {}",
                SESSION_DAYS_RANGE.start(),
                SESSION_DAYS_RANGE.end(),
                self.auth.session_days
            )));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("YA_APPS_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("YA_APPS_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }

        if let Ok(url) = std::env::var("YA_APPS_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(max) = std::env::var("YA_APPS_DATABASE_MAX_CONNECTIONS") {
            if let Ok(max) = max.parse::<u32>() {
                self.database.max_connections = max;
            }
        }

        if let Ok(days) = std::env::var("YA_APPS_AUTH_SESSION_DAYS") {
            if let Ok(days) = days.parse::<i64>() {
                self.auth.session_days = days;
            }
        }

        if let Ok(count) = std::env::var("YA_APPS_NEWS_COUNT_ON_HOME_PAGE") {
            if let Ok(count) = count.parse::<usize>() {
                self.news.count_on_home_page = count;
            }
        }
        if let Ok(words) = std::env::var("YA_APPS_NEWS_BAD_WORDS") {
            self.news.bad_words = words
                .split(',')
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty())
                .collect();
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ENV_KEYS: &[&str] = &[
        "YA_APPS_SERVER_HOST",
        "YA_APPS_SERVER_PORT",
        "YA_APPS_DATABASE_URL",
        "YA_APPS_DATABASE_MAX_CONNECTIONS",
        "YA_APPS_AUTH_SESSION_DAYS",
        "YA_APPS_NEWS_COUNT_ON_HOME_PAGE",
        "YA_APPS_NEWS_BAD_WORDS",
    ];

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        super::CONFIG_ENV_MUTEX
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::path::Path::new("nonexistent_config.yml");
        let config = Config::load(path).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.url, "data/ya-apps.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.auth.session_days, 14);
        assert_eq!(config.news.count_on_home_page, 10);
        assert_eq!(config.news.bad_words, vec!["редиска", "негодяй"]);
        assert_eq!(config.news.warning, "Не ругайтесь!");
        assert!(config.notes.warning.starts_with(" - "));
    }

    #[test]
    fn test_load_empty_file_returns_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.news.count_on_home_page, 10);
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "news:\n  count_on_home_page: 3\n").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.news.count_on_home_page, 3);
        assert_eq!(config.news.bad_words.len(), 2);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
server:
  host: "127.0.0.1"
  port: 9000
database:
  url: "db/test.db"
  max_connections: 2
auth:
  session_days: 1
news:
  count_on_home_page: 5
  bad_words: ["darn"]
  warning: "Mind your language"
notes:
  warning: " is taken"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.url, "db/test.db");
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.auth.session_days, 1);
        assert_eq!(config.news.count_on_home_page, 5);
        assert_eq!(config.news.bad_words, vec!["darn"]);
        assert_eq!(config.news.warning, "Mind your language");
        assert_eq!(config.notes.warning, " is taken");
    }

    #[test]
    fn test_load_invalid_yaml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: not_a_number\n").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn test_load_zero_page_size_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "news:\n  count_on_home_page: 0\n").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("count_on_home_page"));
    }

    #[test]
    fn test_session_days_out_of_range_is_rejected() {
        for days in [0, -1, 3651, i64::MAX] {
            let mut config = Config::default();
            config.auth.session_days = days;
            assert!(
                matches!(config.validate(), Err(ConfigError::ValidationError(_))),
                "session_days = {days}"
            );
        }

        let mut config = Config::default();
        config.auth.session_days = 3650;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_rejects_huge_session_days() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "auth:\n  session_days: 99999999999\n").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("auth.session_days"));
    }

    #[test]
    fn test_env_overrides() {
        let _guard = lock_env();
        clear_env();

        std::env::set_var("YA_APPS_SERVER_PORT", "9100");
        std::env::set_var("YA_APPS_DATABASE_URL", ":memory:");
        std::env::set_var("YA_APPS_NEWS_COUNT_ON_HOME_PAGE", "4");
        std::env::set_var("YA_APPS_NEWS_BAD_WORDS", "foo, bar,,");

        let config =
            Config::load_with_env(std::path::Path::new("nonexistent_config.yml")).unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.database.url, ":memory:");
        assert_eq!(config.news.count_on_home_page, 4);
        assert_eq!(config.news.bad_words, vec!["foo", "bar"]);

        clear_env();
    }

    #[test]
    fn test_env_override_invalid_numbers_ignored() {
        let _guard = lock_env();
        clear_env();

        std::env::set_var("YA_APPS_SERVER_PORT", "not-a-port");
        std::env::set_var("YA_APPS_AUTH_SESSION_DAYS", "soon");

        let config =
            Config::load_with_env(std::path::Path::new("nonexistent_config.yml")).unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.auth.session_days, 14);

        clear_env();
    }
}
