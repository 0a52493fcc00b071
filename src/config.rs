//! Configuration management for Prensa-Oxide

use crate::{Error, Result};
use serde::Deserialize;
use std::env;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Chromium executable path (candidates on PATH are probed when unset)
    pub chrome_path: Option<String>,

    /// Run the browser headless
    pub headless: bool,

    /// Viewport width
    pub viewport_width: u32,

    /// Viewport height
    pub viewport_height: u32,

    /// User-agent override (a realistic one is chosen when unset)
    pub user_agent: Option<String>,

    /// Suppress the automation-detection marker exposed by the browser
    pub suppress_automation: bool,

    /// Readiness wait deadline in seconds
    pub readiness_timeout: u64,

    /// Readiness polling interval in milliseconds
    pub poll_interval_ms: u64,

    /// Retry attempts for stale-reference conditions
    pub retry_attempts: u32,

    /// Backoff between retries in seconds
    pub retry_backoff: u64,

    /// Wall-clock deadline for one whole extract call in seconds
    pub request_timeout: u64,

    /// Optional TOML file with site extraction rules
    pub site_rules_path: Option<String>,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8070,
            chrome_path: None,
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            user_agent: None,
            suppress_automation: true,
            readiness_timeout: 15,
            poll_interval_ms: 250,
            retry_attempts: 3,
            retry_backoff: 1,
            request_timeout: 120,
            site_rules_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(host) = env::var("PRENSA_HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("PRENSA_PORT") {
            config.port = port
                .parse()
                .map_err(|_| Error::configuration("Invalid PRENSA_PORT"))?;
        }

        if let Ok(chrome_path) = env::var("PRENSA_CHROME_PATH") {
            config.chrome_path = Some(chrome_path);
        }

        if let Ok(headless) = env::var("PRENSA_HEADLESS") {
            config.headless = headless
                .parse()
                .map_err(|_| Error::configuration("Invalid PRENSA_HEADLESS"))?;
        }

        if let Ok(user_agent) = env::var("PRENSA_USER_AGENT") {
            config.user_agent = Some(user_agent);
        }

        if let Ok(stealth) = env::var("PRENSA_SUPPRESS_AUTOMATION") {
            config.suppress_automation = stealth
                .parse()
                .map_err(|_| Error::configuration("Invalid PRENSA_SUPPRESS_AUTOMATION"))?;
        }

        if let Ok(timeout) = env::var("PRENSA_READINESS_TIMEOUT") {
            config.readiness_timeout = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid PRENSA_READINESS_TIMEOUT"))?;
        }

        if let Ok(interval) = env::var("PRENSA_POLL_INTERVAL_MS") {
            config.poll_interval_ms = interval
                .parse()
                .map_err(|_| Error::configuration("Invalid PRENSA_POLL_INTERVAL_MS"))?;
        }

        if let Ok(attempts) = env::var("PRENSA_RETRY_ATTEMPTS") {
            config.retry_attempts = attempts
                .parse()
                .map_err(|_| Error::configuration("Invalid PRENSA_RETRY_ATTEMPTS"))?;
        }

        if let Ok(backoff) = env::var("PRENSA_RETRY_BACKOFF") {
            config.retry_backoff = backoff
                .parse()
                .map_err(|_| Error::configuration("Invalid PRENSA_RETRY_BACKOFF"))?;
        }

        if let Ok(timeout) = env::var("PRENSA_REQUEST_TIMEOUT") {
            config.request_timeout = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid PRENSA_REQUEST_TIMEOUT"))?;
        }

        if let Ok(path) = env::var("PRENSA_SITE_RULES") {
            config.site_rules_path = Some(path);
        }

        if let Ok(log_level) = env::var("PRENSA_LOG_LEVEL") {
            config.log_level = log_level;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.headless);
        assert!(config.suppress_automation);
        assert_eq!(config.viewport_width, 1920);
        assert_eq!(config.retry_attempts, 3);
    }

    #[test]
    fn test_from_toml() {
        let toml_str = r#"
            host = "0.0.0.0"
            port = 9000
            headless = false
            viewport_width = 1280
            viewport_height = 720
            suppress_automation = true
            readiness_timeout = 20
            poll_interval_ms = 100
            retry_attempts = 5
            retry_backoff = 2
            request_timeout = 60
            log_level = "debug"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.port, 9000);
        assert!(!config.headless);
        assert_eq!(config.retry_attempts, 5);
        assert!(config.chrome_path.is_none());
    }
}
