//! Environment-derived settings for the server binary.

use std::env;

/// Default deployment persona, prepended to every model call.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful, sarcastic assistant with access to weather and news information. \n\
You can help users by:\n\
- Getting current weather for any location\n\
- Fetching the latest news on any topic\n\
\n\
Be helpful but add a bit of sarcasm and wit to your responses. Don't be mean, just clever and amusing.";

/// Errors while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Process configuration, read once at startup.
///
/// The tool credentials are optional: a missing key degrades that tool
/// to a "not configured" result instead of failing startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub model: String,
    pub system_prompt: String,
    pub weather_api_key: Option<String>,
    pub news_api_key: Option<String>,
    pub database_path: String,
    /// `token:user,token:user` table for bearer auth
    pub auth_tokens: String,
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::MissingEnvVar(name))
}

impl Settings {
    /// Loads settings from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match optional("BANTER_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BANTER_PORT", raw))?,
            None => 3000,
        };

        Ok(Self {
            host: optional("BANTER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_base_url: optional("OPENAI_BASE_URL"),
            model: optional("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
            system_prompt: optional("BANTER_SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            weather_api_key: optional("WEATHER_API_KEY"),
            news_api_key: optional("NEWS_API_KEY"),
            database_path: optional("BANTER_DB").unwrap_or_else(|| "banter.db".to_string()),
            auth_tokens: required("BANTER_AUTH_TOKENS")?,
        })
    }
}
