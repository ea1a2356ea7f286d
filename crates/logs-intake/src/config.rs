// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::error::ConfigError;

const DEFAULT_STORAGE_ROOT: &str = "logs";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_FILE: &str = "server_logs_api.log";
const DEFAULT_MAX_REQUEST_CONTENT_LENGTH: usize = 10 * 1024 * 1024; // 10MB in Bytes

/// Placeholder secret used when `API_KEY` is unset. Never expose a server running with it.
pub const DEFAULT_API_KEY: &str = "your-secret-api-key";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone)]
pub struct Config {
    /// base directory of the `<source_type>/<date>/<hour>_<digest>.json` tree
    pub storage_root: PathBuf,
    /// static bearer token every protected endpoint compares against
    pub api_key: String,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    /// optional file that receives a copy of the process log
    pub log_file: Option<PathBuf>,
    pub max_request_content_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            api_key: DEFAULT_API_KEY.to_string(),
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
            max_request_content_length: DEFAULT_MAX_REQUEST_CONTENT_LENGTH,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment, falling back to
    /// defaults for anything unset or unparseable.
    pub fn new() -> Result<Config, ConfigError> {
        let defaults = Config::default();

        let storage_root = env::var("LOG_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_root);
        let api_key = env::var("API_KEY").unwrap_or(defaults.api_key);
        let host = env::var("HOST")
            .ok()
            .and_then(|host| host.parse::<IpAddr>().ok())
            .unwrap_or(defaults.host);
        let port = env::var("PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or(defaults.port);
        let log_level = env::var("LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or(defaults.log_level);
        // an explicitly empty LOG_FILE turns file logging off
        let log_file = match env::var("LOG_FILE") {
            Ok(path) if path.trim().is_empty() => None,
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => defaults.log_file,
        };
        let max_request_content_length = env::var("MAX_REQUEST_CONTENT_LENGTH")
            .ok()
            .and_then(|len| len.parse::<usize>().ok())
            .unwrap_or(defaults.max_request_content_length);

        let config = Config {
            storage_root,
            api_key,
            host,
            port,
            log_level,
            log_file,
            max_request_content_length,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::Invalid("API_KEY cannot be empty".to_string()));
        }

        if self.storage_root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "LOG_STORAGE_DIR cannot be empty".to_string(),
            ));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        if self.max_request_content_length == 0 {
            return Err(ConfigError::Invalid(
                "MAX_REQUEST_CONTENT_LENGTH must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn uses_default_api_key(&self) -> bool {
        self.api_key == DEFAULT_API_KEY
    }
}
