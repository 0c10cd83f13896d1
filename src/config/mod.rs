use crate::constants::{self, env_vars};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub mod paths;
pub mod validation;

use paths::{get_config_path, get_log_dir_path};
use validation::validate_config;

/// Configuration structure for the application.
/// Handles loading, saving, and managing application settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the ranking API, without trailing slash.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// HTTP timeout in seconds for API requests.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    /// Delay before the first retry; doubled on every further attempt.
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,
    /// Upper bound for the retry delay.
    #[serde(default = "default_retry_max_delay")]
    pub retry_max_delay_ms: u64,
    /// Randomize retry delays to spread out clients hitting the same failure.
    #[serde(default)]
    pub retry_jitter: bool,
}

fn default_api_base_url() -> String {
    constants::DEFAULT_API_BASE_URL.to_string()
}

fn default_http_timeout() -> u64 {
    constants::DEFAULT_HTTP_TIMEOUT_SECONDS
}

fn default_retry_base_delay() -> u64 {
    constants::retry::BASE_DELAY_MS
}

fn default_retry_max_delay() -> u64 {
    constants::retry::MAX_DELAY_MS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: default_api_base_url(),
            log_file_path: None,
            http_timeout_seconds: default_http_timeout(),
            retry_base_delay_ms: default_retry_base_delay(),
            retry_max_delay_ms: default_retry_max_delay(),
            retry_jitter: false,
        }
    }
}

impl Config {
    /// Loads configuration from the default config file location.
    /// Missing files are not an error: defaults are used instead.
    ///
    /// # Environment Variables
    /// - `API_BASE_URL` - Override API base URL
    /// - `BANGUMI_RANK_LOG_FILE` - Override log file path
    /// - `BANGUMI_RANK_HTTP_TIMEOUT` - Override HTTP timeout in seconds
    ///
    /// Environment variables take precedence over config file values.
    pub async fn load() -> Result<Self, AppError> {
        Self::load_with_overrides(&get_config_path()).await
    }

    /// Loads the file at `path` (or defaults), applies environment
    /// overrides and validates the result.
    pub async fn load_with_overrides(path: &str) -> Result<Self, AppError> {
        let mut config = if Path::new(path).exists() {
            Self::load_from_path(path).await?
        } else {
            tracing::debug!("No config file at {path}, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.api_base_url = normalize_base_url(&config.api_base_url);
        config.validate()?;

        Ok(config)
    }

    /// Loads configuration from a custom file path without environment overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(api_base_url) = std::env::var(env_vars::API_BASE_URL)
            && !api_base_url.trim().is_empty()
        {
            self.api_base_url = api_base_url;
        }

        if let Ok(log_file_path) = std::env::var(env_vars::LOG_FILE) {
            self.log_file_path = Some(log_file_path);
        }

        if let Some(timeout) = std::env::var(env_vars::HTTP_TIMEOUT)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.http_timeout_seconds = timeout;
        }
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(
            &self.api_base_url,
            &self.log_file_path,
            self.http_timeout_seconds,
            self.retry_base_delay_ms,
            self.retry_max_delay_ms,
        )
    }

    /// HTTP timeout as a `Duration`
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    /// Saves current configuration to the default config file location.
    pub async fn save(&self) -> Result<(), AppError> {
        self.save_to_path(&get_config_path()).await
    }

    /// Saves configuration to a custom file path.
    ///
    /// Creates the parent directory if it doesn't exist and normalizes the
    /// API base URL (scheme added, trailing slash removed).
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }

        let content = toml::to_string_pretty(&Config {
            api_base_url: normalize_base_url(&self.api_base_url),
            ..self.clone()
        })?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Returns the platform-specific path for the config file.
    pub fn get_config_path() -> String {
        paths::get_config_path()
    }

    /// Returns the platform-specific path for the log directory.
    pub fn get_log_dir_path() -> String {
        paths::get_log_dir_path()
    }

    /// Displays current configuration settings to stdout.
    pub async fn display() -> Result<(), AppError> {
        let config_path = get_config_path();
        let log_dir = get_log_dir_path();
        let config = Config::load().await?;

        println!("\nCurrent Configuration");
        println!("────────────────────────────────────");
        println!("Config Location:");
        if Path::new(&config_path).exists() {
            println!("{config_path}");
        } else {
            println!("{config_path}");
            println!("(Not created yet, using defaults)");
        }
        println!("────────────────────────────────────");
        println!("API Base URL:");
        println!("{}", config.api_base_url);
        println!("────────────────────────────────────");
        println!("HTTP Timeout:");
        println!("{} seconds", config.http_timeout_seconds);
        println!("────────────────────────────────────");
        println!("Retry Backoff:");
        println!(
            "{} ms doubling up to {} ms{}",
            config.retry_base_delay_ms,
            config.retry_max_delay_ms,
            if config.retry_jitter { " (jittered)" } else { "" }
        );
        println!("────────────────────────────────────");
        println!("Log File Location:");
        if let Some(custom_path) = &config.log_file_path {
            println!("{custom_path}");
        } else {
            println!("{log_dir}/{}", constants::LOG_FILE_NAME);
            println!("(Default location)");
        }

        Ok(())
    }
}

/// Adds `https://` when no scheme is given and strips trailing slashes.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}
