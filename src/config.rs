//! Configuration management for cri-targets

use crate::{Error, Result};
use serde::Deserialize;
use std::env;

/// Connection configuration for the remote debugging endpoint
///
/// A config file only needs the fields it overrides; everything else
/// falls back to the defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host of the remote debugging endpoint
    pub host: String,

    /// Port of the remote debugging endpoint
    pub port: u16,

    /// Browser-level debug WebSocket URL (distinct from per-page sessions)
    pub browser_debug_url: String,

    /// Running against Firefox, which does not supply opener ids reliably
    pub firefox: bool,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9222,
            browser_debug_url: "ws://127.0.0.1:9222/devtools/browser".to_string(),
            firefox: false,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(host) = env::var("CRI_HOST") {
            config.host = host;
        }

        if let Ok(port) = env::var("CRI_PORT") {
            config.port = port
                .parse()
                .map_err(|_| Error::configuration("Invalid CRI_PORT"))?;
        }

        if let Ok(debug_url) = env::var("CRI_BROWSER_DEBUG_URL") {
            config.browser_debug_url = debug_url;
        }

        if let Ok(firefox) = env::var("CRI_FIREFOX") {
            config.firefox = firefox
                .parse()
                .map_err(|_| Error::configuration("Invalid CRI_FIREFOX"))?;
        }

        if let Ok(log_level) = env::var("CRI_LOG_LEVEL") {
            config.log_level = log_level;
        }

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// HTTP endpoint for the top-level target list (host/port parameterized)
    pub fn list_endpoint(&self) -> String {
        format!("http://{}:{}/json", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9222);
        assert!(!config.firefox);
    }

    #[test]
    fn test_list_endpoint() {
        let config = Config {
            host: "localhost".to_string(),
            port: 9333,
            ..Config::default()
        };
        assert_eq!(config.list_endpoint(), "http://localhost:9333/json");
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join("cri-targets-config-full.toml");
        std::fs::write(
            &path,
            concat!(
                "host = \"10.0.0.5\"\n",
                "port = 9333\n",
                "browser_debug_url = \"ws://10.0.0.5:9333/devtools/browser\"\n",
                "firefox = true\n",
                "log_level = \"debug\"\n",
            ),
        )
        .unwrap();

        let config = Config::from_file(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 9333);
        assert_eq!(
            config.browser_debug_url,
            "ws://10.0.0.5:9333/devtools/browser"
        );
        assert!(config.firefox);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_from_file_partial_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("cri-targets-config-partial.toml");
        std::fs::write(&path, "firefox = true\n").unwrap();

        let config = Config::from_file(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(config.firefox);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9222);
    }

    #[test]
    fn test_from_file_missing_is_io_error() {
        let err = Config::from_file("/nonexistent/cri-targets.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_file_rejects_malformed_toml() {
        let path = std::env::temp_dir().join("cri-targets-config-malformed.toml");
        std::fs::write(&path, "port = \"not-a-port\"\n").unwrap();

        let err = Config::from_file(path.to_str().unwrap()).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(err, Error::Configuration(_)));
    }

    // Environment variables are process-global, so every CRI_* case lives
    // in this one test to keep the parallel test runner away from them.
    #[test]
    fn test_from_env_overrides() {
        env::set_var("CRI_HOST", "192.168.1.20");
        env::set_var("CRI_PORT", "9444");
        env::set_var("CRI_FIREFOX", "true");

        let config = Config::from_env().unwrap();
        assert_eq!(config.host, "192.168.1.20");
        assert_eq!(config.port, 9444);
        assert!(config.firefox);
        // Untouched variables keep their defaults
        assert_eq!(config.log_level, "info");

        env::set_var("CRI_PORT", "not-a-port");
        assert!(matches!(
            Config::from_env().unwrap_err(),
            Error::Configuration(_)
        ));

        env::remove_var("CRI_HOST");
        env::remove_var("CRI_PORT");
        env::remove_var("CRI_FIREFOX");
    }
}
