use std::{env, path::PathBuf};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIME_API_URL: &str = "https://timeapi.io";
const DEFAULT_HOLIDAY_API_URL: &str = "https://date.nager.at";
const DEFAULT_ICON_PATH: &str = "favicon.svg";

#[derive(Clone, Debug)]
pub struct Config {
    /// Port of the listening socket
    pub port: u16,
    /// Public URL the service advertises in its registration document
    pub base_url: String,
    pub time_api_url: String,
    pub holiday_api_url: String,
    pub icon_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let base_url = lookup("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let time_api_url = lookup("TIME_API_URL")
            .unwrap_or_else(|| DEFAULT_TIME_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let holiday_api_url = lookup("HOLIDAY_API_URL")
            .unwrap_or_else(|| DEFAULT_HOLIDAY_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let icon_path = lookup("ICON_PATH")
            .unwrap_or_else(|| DEFAULT_ICON_PATH.to_string())
            .into();

        Ok(Config {
            port,
            base_url,
            time_api_url,
            holiday_api_url,
            icon_path,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(String),
}
