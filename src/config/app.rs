use std::{env, net::SocketAddr, time::Duration};

use tracing::warn;

use crate::error::ConfigError;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for the proxy server
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root of the authentication/profile backend, without trailing slash
    pub base_url: String,
    pub bind_addr: SocketAddr,
    pub backend_timeout: Duration,
    pub environment: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("BASE_URL").unwrap_or_else(|_| {
            warn!("BASE_URL not set; using {}", DEFAULT_BASE_URL);
            DEFAULT_BASE_URL.to_string()
        });

        let bind_raw = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "BIND_ADDR",
                value: bind_raw.clone(),
            })?;

        let backend_timeout = match env::var("BACKEND_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                    key: "BACKEND_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            base_url: normalize_base_url(&base_url),
            bind_addr,
            backend_timeout,
            environment: current_environment(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            backend_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            environment: "development".to_string(),
        }
    }
}

/// Refuses to forward credentials over plain HTTP in production.
pub fn validate_production_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.is_production() && !config.base_url.starts_with("https://") {
        return Err(ConfigError::InsecureBackend(config.base_url.clone()));
    }
    Ok(())
}

fn current_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_trimmed() {
        assert_eq!(
            normalize_base_url("https://api.example.com//"),
            "https://api.example.com"
        );
        assert_eq!(normalize_base_url(" http://x:8000 "), "http://x:8000");
    }

    #[test]
    fn production_rejects_plain_http_backend() {
        let config = AppConfig {
            environment: "production".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            validate_production_config(&config),
            Err(ConfigError::InsecureBackend(_))
        ));

        let secure = AppConfig {
            base_url: "https://api.example.com".to_string(),
            ..config
        };
        assert!(validate_production_config(&secure).is_ok());
    }

    #[test]
    fn development_allows_plain_http_backend() {
        assert!(validate_production_config(&AppConfig::default()).is_ok());
    }
}
