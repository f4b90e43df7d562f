use crate::constants::{self, cache_ttl, history, refresh, window};
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
///
/// Every value here is an immutable input to the board: the controller,
/// scheduler and fetchers read it once at construction time. Changing it
/// means building a new controller.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the primary board API (serves `/board`).
    #[serde(default = "default_api_domain")]
    pub api_domain: String,
    /// Base URL of OpenLigaDB, used for detail, roster and standings lookups.
    #[serde(default = "default_openliga_domain")]
    pub openliga_domain: String,
    /// Competition codes selected when the board starts.
    #[serde(default = "default_competitions")]
    pub default_competitions: Vec<String>,
    /// Season selected when the board starts. `None` lets the upstream pick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_season: Option<i32>,
    #[serde(default = "default_days_back")]
    pub days_back: u32,
    #[serde(default = "default_days_ahead")]
    pub days_ahead: u32,
    /// Periodic refresh interval. 0 disables periodic refresh.
    #[serde(default = "default_refresh_seconds")]
    pub refresh_seconds: u64,
    /// How far back the round history reaches.
    #[serde(default = "default_history_days_back")]
    pub history_days_back: u32,
    #[serde(default = "default_rounds_per_page")]
    pub rounds_per_page: usize,
    /// TTL for cached OpenLigaDB lookups.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
    /// HTTP timeout in seconds for API requests. Defaults to 30 seconds if not specified.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
}

fn default_api_domain() -> String {
    constants::DEFAULT_API_DOMAIN.to_string()
}

fn default_openliga_domain() -> String {
    constants::DEFAULT_OPENLIGA_DOMAIN.to_string()
}

fn default_competitions() -> Vec<String> {
    vec![constants::DEFAULT_COMPETITION.to_string()]
}

fn default_days_back() -> u32 {
    window::DEFAULT_DAYS_BACK
}

fn default_days_ahead() -> u32 {
    window::DEFAULT_DAYS_AHEAD
}

fn default_refresh_seconds() -> u64 {
    refresh::DEFAULT_SECONDS
}

fn default_history_days_back() -> u32 {
    history::DEFAULT_DAYS_BACK
}

fn default_rounds_per_page() -> usize {
    history::DEFAULT_ROUNDS_PER_PAGE
}

fn default_cache_ttl() -> u64 {
    cache_ttl::DEFAULT_SECONDS
}

fn default_http_timeout() -> u64 {
    constants::DEFAULT_HTTP_TIMEOUT_SECONDS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_domain: default_api_domain(),
            openliga_domain: default_openliga_domain(),
            default_competitions: default_competitions(),
            default_season: None,
            days_back: default_days_back(),
            days_ahead: default_days_ahead(),
            refresh_seconds: default_refresh_seconds(),
            history_days_back: default_history_days_back(),
            rounds_per_page: default_rounds_per_page(),
            cache_ttl_seconds: default_cache_ttl(),
            http_timeout_seconds: default_http_timeout(),
            log_file_path: None,
        }
    }
}

impl Config {
    /// Loads configuration from the default config file location.
    /// If no config file exists, defaults are used.
    /// Environment variables can override config file values.
    ///
    /// # Environment Variables
    /// - `MATCHBOARD_API_DOMAIN` - Override primary API domain
    /// - `MATCHBOARD_OPENLIGA_DOMAIN` - Override OpenLigaDB domain
    /// - `MATCHBOARD_LEAGUES` - Comma-separated default competitions
    /// - `MATCHBOARD_SEASON` - Default season
    /// - `MATCHBOARD_REFRESH_SECONDS` - Refresh interval in seconds
    /// - `MATCHBOARD_LOG_FILE` - Override log file path
    /// - `MATCHBOARD_HTTP_TIMEOUT` - Override HTTP timeout in seconds
    pub async fn load() -> Result<Self, AppError> {
        let config_path = get_config_path();

        let mut config = if Path::new(&config_path).exists() {
            Self::load_from_path(&config_path).await?
        } else {
            tracing::debug!("No config file at {config_path}, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.normalize_domains();
        config.validate()?;

        Ok(config)
    }

    /// Applies `MATCHBOARD_*` environment overrides in place.
    /// Values that fail to parse are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(api_domain) = std::env::var("MATCHBOARD_API_DOMAIN") {
            self.api_domain = api_domain;
        }

        if let Ok(openliga_domain) = std::env::var("MATCHBOARD_OPENLIGA_DOMAIN") {
            self.openliga_domain = openliga_domain;
        }

        if let Ok(leagues) = std::env::var("MATCHBOARD_LEAGUES") {
            let parsed = parse_competition_list(&leagues);
            if !parsed.is_empty() {
                self.default_competitions = parsed;
            }
        }

        if let Some(season) = std::env::var("MATCHBOARD_SEASON")
            .ok()
            .and_then(|s| s.trim().parse::<i32>().ok())
        {
            self.default_season = Some(season);
        }

        if let Some(seconds) = std::env::var("MATCHBOARD_REFRESH_SECONDS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            self.refresh_seconds = seconds;
        }

        if let Ok(log_file_path) = std::env::var("MATCHBOARD_LOG_FILE") {
            self.log_file_path = Some(log_file_path);
        }

        if let Some(timeout) = std::env::var("MATCHBOARD_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            self.http_timeout_seconds = timeout;
        }
    }

    /// Adds the `https://` scheme to domains written without one.
    pub fn normalize_domains(&mut self) {
        self.api_domain = with_scheme(self.api_domain.trim());
        self.openliga_domain = with_scheme(self.openliga_domain.trim());
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(self)
    }

    /// Primary API base without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.api_domain.trim_end_matches('/')
    }

    /// OpenLigaDB base without a trailing slash.
    pub fn openliga_base(&self) -> &str {
        self.openliga_domain.trim_end_matches('/')
    }

    /// Periodic refresh interval, clamped to the supported range.
    /// `Duration::ZERO` means periodic refresh is disabled.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_seconds.min(refresh::MAX_SECONDS))
    }

    /// TTL applied to cached OpenLigaDB lookups.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Saves current configuration to the default config file location.
    pub async fn save(&self) -> Result<(), AppError> {
        let config_path = get_config_path();
        self.save_to_path(&config_path).await
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
            println!("{config_path} (not created, using defaults)");
        }
        println!("────────────────────────────────────");
        println!("Board API:       {}", config.api_domain);
        println!("OpenLigaDB API:  {}", config.openliga_domain);
        println!("Competitions:    {}", config.default_competitions.join(", "));
        match config.default_season {
            Some(season) => println!("Season:          {season}"),
            None => println!("Season:          (upstream default)"),
        }
        println!(
            "Window:          {} days back, {} days ahead",
            config.days_back, config.days_ahead
        );
        println!("Refresh:         {} seconds", config.refresh_seconds);
        println!(
            "History:         {} days, {} rounds per page",
            config.history_days_back, config.rounds_per_page
        );
        println!("Cache TTL:       {} seconds", config.cache_ttl_seconds);
        println!("HTTP Timeout:    {} seconds", config.http_timeout_seconds);
        println!("────────────────────────────────────");
        println!("Log File Location:");
        if let Some(custom_path) = &config.log_file_path {
            println!("{custom_path}");
        } else {
            println!("{log_dir}/matchboard.log");
            println!("(Default location)");
        }

        Ok(())
    }

    /// Saves configuration to a custom file path.
    ///
    /// Creates the parent directory if it doesn't exist and ensures both API
    /// domains carry a scheme (https:// is assumed when missing).
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

        let mut normalized = self.clone();
        normalized.normalize_domains();
        let content = toml::to_string_pretty(&normalized)?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Loads configuration from a custom file path. Missing keys take defaults.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Splits a comma-separated competition list, trimming and lower-casing
/// entries and dropping blanks and duplicates.
pub fn parse_competition_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for code in raw.split(',') {
        let code = code.trim().to_lowercase();
        if !code.is_empty() && !out.contains(&code) {
            out.push(code);
        }
    }
    out
}

fn with_scheme(domain: &str) -> String {
    if domain.starts_with("https://") || domain.starts_with("http://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}
