use std::str::FromStr;

use thiserror::Error;
use tracing::Level;
use url::Url;

const DEFAULT_SMS_URL: &str = "https://rest.nexmo.com/sms/json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} should be set.")]
    Missing(&'static str),
    #[error("{name} can't be parsed: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Process settings, read from the environment (and `.env`, via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub nexmo_api_key: String,
    pub nexmo_api_secret: String,
    pub nexmo_sms_url: Url,
    pub host: String,
    pub port: u16,
    pub log_level: Level,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            nexmo_api_key: required("NEXMO_API_KEY")?,
            nexmo_api_secret: required("NEXMO_API_SECRET")?,
            nexmo_sms_url: parsed(&lookup, "NEXMO_SMS_URL", DEFAULT_SMS_URL)?,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port: parsed(&lookup, "PORT", "8000")?,
            log_level: parsed(&lookup, "LOG_LEVEL", "info")?,
        })
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: &str,
) -> Result<T, ConfigError> {
    let value = lookup(name).unwrap_or_else(|| default.to_owned());
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
