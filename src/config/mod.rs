//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::DEFAULT_TOURNAMENT_NAME;
use crate::schedule::LeftoverPolicy;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Tournament setup defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Name used when a tournament is started without one
    #[serde(default = "default_tournament_name")]
    pub default_name: String,

    #[serde(default)]
    pub leftover_policy: LeftoverPolicy,

    /// Highest round count offered by the round selector
    #[serde(default = "default_round_choice_limit")]
    pub round_choice_limit: usize,
}

fn default_tournament_name() -> String {
    DEFAULT_TOURNAMENT_NAME.to_string()
}

fn default_round_choice_limit() -> usize {
    13
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            default_name: default_tournament_name(),
            leftover_policy: LeftoverPolicy::default(),
            round_choice_limit: default_round_choice_limit(),
        }
    }
}

/// Rating and history settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingConfig {
    /// Trailing window, in days
    #[serde(default = "default_window_days")]
    pub window_days: i64,

    #[serde(default = "default_history_page_size")]
    pub history_page_size: usize,
}

fn default_window_days() -> i64 {
    crate::calculate::DEFAULT_WINDOW_DAYS
}

fn default_history_page_size() -> usize {
    5
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            history_page_size: default_history_page_size(),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Attempts per profile update before giving up on conflicts
    #[serde(default = "default_max_profile_retries")]
    pub max_profile_retries: u32,
}

fn default_max_profile_retries() -> u32 {
    5
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_profile_retries: default_max_profile_retries(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub tournament: TournamentConfig,

    #[serde(default)]
    pub rating: RatingConfig,

    #[serde(default)]
    pub storage: StoreConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            server: ServerConfig::default(),
            tournament: TournamentConfig::default(),
            rating: RatingConfig::default(),
            storage: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.rating.window_days <= 0 {
            return Err(ConfigError::ValidationError(
                "Rating window must be at least one day".to_string(),
            ));
        }

        if self.rating.history_page_size == 0 {
            return Err(ConfigError::ValidationError(
                "History page size must be greater than 0".to_string(),
            ));
        }

        if self.storage.max_profile_retries == 0 {
            return Err(ConfigError::ValidationError(
                "Profile retries must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
