use interviewer_core::session_store::DEFAULT_MAX_TURNS;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// Base URL of Groq's OpenAI-compatible API.
pub const DEFAULT_GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Provider credential. `None` runs the service in degraded mode.
    pub groq_api_key: Option<String>,
    pub groq_api_base: String,
    /// Default model override; requests may still pick their own.
    pub default_model: Option<String>,
    /// Turns retained per session after the system turn.
    pub session_max_turns: usize,
    /// Idle sessions older than this are dropped. `None` keeps them forever.
    pub session_idle_ttl: Option<Duration>,
    pub log_level: Level,
}

/// Reads an optional variable, treating blank values as unset.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let groq_api_key = optional_var("GROQ_API_KEY");
        let groq_api_base =
            optional_var("GROQ_API_BASE").unwrap_or_else(|| DEFAULT_GROQ_API_BASE.to_string());
        let default_model = optional_var("GROQ_MODEL");

        let session_max_turns = match optional_var("SESSION_MAX_TURNS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "SESSION_MAX_TURNS".to_string(),
                        format!("'{}' is not a positive integer", raw),
                    ));
                }
            },
            None => DEFAULT_MAX_TURNS,
        };

        let session_idle_ttl = match optional_var("SESSION_IDLE_TTL_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "SESSION_IDLE_TTL_SECS".to_string(),
                        format!("'{}' is not a positive number of seconds", raw),
                    ));
                }
            },
            None => None,
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            groq_api_key,
            groq_api_base,
            default_model,
            session_max_turns,
            session_idle_ttl,
            log_level,
        })
    }
}
