//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// Gemini's OpenAI-compatible endpoint.
pub const DEFAULT_AI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_AI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

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
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    pub log_level: Level,
    pub ai_api_key: String,
    pub ai_api_base: String,
    pub ai_model: String,
    pub ai_timeout: Duration,
    pub firebase_api_key: String,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| lookup(name).ok_or_else(|| ConfigError::MissingVar(name.to_string()));

        // --- Load Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:5000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = required("DATABASE_URL")?;
        let database_max_connections =
            parse_number(&lookup, "DATABASE_MAX_CONNECTIONS", 5u32)?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load AI Provider Settings ---
        let ai_api_key = required("AI_API_KEY")?;
        let ai_api_base = lookup("AI_API_BASE").unwrap_or_else(|| DEFAULT_AI_API_BASE.to_string());
        let ai_model = lookup("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string());
        let ai_timeout_secs = parse_number(&lookup, "AI_TIMEOUT_SECS", 60u64)?;
        if ai_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "AI_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        // --- Load Identity Provider Settings ---
        let firebase_api_key = required("FIREBASE_API_KEY")?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            bind_address,
            database_url,
            database_max_connections,
            log_level,
            ai_api_key,
            ai_api_base,
            ai_model,
            ai_timeout: Duration::from_secs(ai_timeout_secs),
            firebase_api_key,
            cors_origins,
        })
    }
}

fn parse_number<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/studentflow"),
        ("AI_API_KEY", "ai-key"),
        ("FIREBASE_API_KEY", "fb-key"),
    ];

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let config = Config::from_lookup(env(&REQUIRED)).unwrap();
        assert_eq!(config.bind_address.port(), 5000);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.ai_model, DEFAULT_AI_MODEL);
        assert_eq!(config.ai_timeout, Duration::from_secs(60));
        assert_eq!(config.cors_origins.len(), 2);
    }

    #[test]
    fn missing_database_url_is_reported() {
        let err = Config::from_lookup(env(&REQUIRED[1..])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(name) if name == "DATABASE_URL"));
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("AI_TIMEOUT_SECS", "soon"));
        let err = Config::from_lookup(env(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "AI_TIMEOUT_SECS"));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("RUST_LOG", "chatty"));
        assert!(Config::from_lookup(env(&pairs)).is_err());
    }
}
