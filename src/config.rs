use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Studydesk client.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base URL of the notes backend API.
    pub api_base_url: String,
    /// Optional per-request deadline applied to every backend call, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Optional override for the default number of results requested from search/ask.
    pub search_top_k: Option<usize>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: load_env("STUDYDESK_API_URL")?,
            request_timeout_secs: load_env_optional("STUDYDESK_REQUEST_TIMEOUT_SECS")
                .map(|value| {
                    value.parse().map_err(|_| {
                        ConfigError::InvalidValue("STUDYDESK_REQUEST_TIMEOUT_SECS".to_string())
                    })
                })
                .transpose()?,
            search_top_k: load_env_optional("STUDYDESK_SEARCH_TOP_K")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("STUDYDESK_SEARCH_TOP_K".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        api_base_url = %config.api_base_url,
        request_timeout_secs = ?config.request_timeout_secs,
        search_top_k = ?config.search_top_k,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
