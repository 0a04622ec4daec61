//! services/app/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development.

use bridge_ed_core::domain::Language;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: Level,
    /// Location of the JSON file backing the local key-value store.
    pub storage_path: PathBuf,
    pub openai_api_key: Option<String>,
    pub exercise_model: String,
    pub grading_model: String,
    pub tutor_model: String,
    pub translation_model: String,
    /// When false the gateway skips its fabricated per-service delays.
    pub simulate_latency: bool,
    pub default_language: Language,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for
    /// development, but this is skipped in test environments to ensure tests
    /// are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let storage_path = std::env::var("STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./bridge_ed_store.json"));

        // --- Load API Key (as optional; the binary requires it) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Adapter-specific Settings ---
        let exercise_model =
            std::env::var("EXERCISE_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let grading_model =
            std::env::var("GRADING_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let tutor_model = std::env::var("TUTOR_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let translation_model =
            std::env::var("TRANSLATION_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let simulate_latency_str =
            std::env::var("SIMULATE_LATENCY").unwrap_or_else(|_| "true".to_string());
        let simulate_latency = simulate_latency_str.parse::<bool>().map_err(|_| {
            ConfigError::InvalidValue(
                "SIMULATE_LATENCY".to_string(),
                format!("'{}' is not a boolean", simulate_latency_str),
            )
        })?;

        let default_language_str =
            std::env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| "en".to_string());
        let default_language = default_language_str.parse::<Language>().map_err(|e| {
            ConfigError::InvalidValue("DEFAULT_LANGUAGE".to_string(), e)
        })?;

        Ok(Self {
            log_level,
            storage_path,
            openai_api_key,
            exercise_model,
            grading_model,
            tutor_model,
            translation_model,
            simulate_latency,
            default_language,
        })
    }
}
