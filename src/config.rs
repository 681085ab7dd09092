use std::env;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    /// Token signing secret. Never empty.
    pub secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub cors_allow_origins: Vec<String>,
    /// Domain attribute for the session cookie.
    pub api_domain: Option<String>,
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,
    /// Time limit for each `/api/v1` request, in seconds.
    pub request_timeout_secs: u64,
    pub app_env: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let server_port = match get("WEB_PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "WEB_PORT",
                value,
            })?,
            None => 8080,
        };

        let cookie_secure = match get("COOKIE_SECURE") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "COOKIE_SECURE",
                value,
            })?,
            None => false,
        };

        let bcrypt_cost = match get("BCRYPT_COST") {
            Some(value) => match value.parse::<u32>() {
                Ok(cost) if (4..=31).contains(&cost) => cost,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "BCRYPT_COST",
                        value,
                    })
                }
            },
            None => bcrypt::DEFAULT_COST,
        };

        let request_timeout_secs = match get("API_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "API_TIMEOUT_SECS",
                        value,
                    })
                }
            },
            None => 2,
        };

        let cors_allow_origins = get("WEB_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            secret: required("SECRET")?,
            server_host: get("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port,
            cors_allow_origins,
            api_domain: get("API_DOMAIN"),
            cookie_secure,
            bcrypt_cost,
            request_timeout_secs,
            app_env: get("APP_ENV").unwrap_or_else(|| "development".to_string()),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
