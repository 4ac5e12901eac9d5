//! Environment-driven configuration.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use atlas_core::retry::RetryConfig;
use atlas_runtime::EngineConfig;

/// A configuration variable carried a value that does not parse.
#[derive(Debug, Error)]
#[error("invalid value '{value}' for {var}")]
pub struct SettingsError {
    /// The environment variable name.
    pub var: &'static str,
    /// The rejected value.
    pub value: String,
}

/// Server configuration, loaded from the environment with defaults
/// matching a local Ollama development setup.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Base URL of the OpenAI-compatible generation backend.
    pub ollama_base_url: String,
    /// Model name passed to the backend.
    pub ollama_model: String,
    /// Origin allowed by CORS (the frontend dev server).
    pub frontend_origin: String,
    /// Bound on generation stream opening and delta gaps, in seconds.
    pub generation_timeout_secs: u64,
    /// Bound on a single tool execution, in seconds.
    pub tool_timeout_secs: u64,
    /// Retry attempts for transient generation failures.
    pub max_retries: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            ollama_base_url: "http://localhost:11434".into(),
            ollama_model: "qwen3:8b".into(),
            frontend_origin: "http://localhost:5173".into(),
            generation_timeout_secs: 120,
            tool_timeout_secs: 30,
            max_retries: 3,
        }
    }
}

fn env_string(var: &'static str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_owned())
}

fn env_parse<T: FromStr>(var: &'static str, default: T) -> Result<T, SettingsError> {
    match std::env::var(var) {
        Ok(value) => value.parse().map_err(|_| SettingsError { var, value }),
        Err(_) => Ok(default),
    }
}

impl Settings {
    /// Load settings from the environment, falling back to defaults for
    /// unset variables. A set-but-unparseable variable is an error.
    pub fn from_env() -> Result<Self, SettingsError> {
        let defaults = Self::default();
        Ok(Self {
            host: env_string("HOST", &defaults.host),
            port: env_parse("PORT", defaults.port)?,
            ollama_base_url: env_string("OLLAMA_BASE_URL", &defaults.ollama_base_url),
            ollama_model: env_string("OLLAMA_MODEL", &defaults.ollama_model),
            frontend_origin: env_string("FRONTEND_ORIGIN", &defaults.frontend_origin),
            generation_timeout_secs: env_parse(
                "GENERATION_TIMEOUT_SECS",
                defaults.generation_timeout_secs,
            )?,
            tool_timeout_secs: env_parse("TOOL_TIMEOUT_SECS", defaults.tool_timeout_secs)?,
            max_retries: env_parse("MAX_RETRIES", defaults.max_retries)?,
        })
    }

    /// Engine bounds derived from these settings.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            generation_timeout: Duration::from_secs(self.generation_timeout_secs),
            tool_timeout: Duration::from_secs(self.tool_timeout_secs),
            retry: RetryConfig {
                max_retries: self.max_retries,
                ..RetryConfig::default()
            },
        }
    }
}
