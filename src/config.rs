use std::path::PathBuf;

use thiserror::Error;

use crate::constants::DEFAULT_MAX_BODY_BYTES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub data_file: PathBuf,

    // Web Server
    pub web_host: String,
    pub web_port: u16,
    pub static_dir: PathBuf,
    pub max_body_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `DB_FILE` and `PORT` are accepted as fallbacks for `DATA_FILE` and `WEB_PORT`.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_file = optional_env("DATA_FILE")
            .or_else(|| optional_env("DB_FILE"))
            .unwrap_or_else(|| "./data/data.json".to_string());

        let web_port = match optional_env("WEB_PORT") {
            Some(_) => parse_env_u16("WEB_PORT", 3000)?,
            None => parse_env_u16("PORT", 3000)?,
        };

        Ok(Self {
            // Storage
            data_file: PathBuf::from(data_file),

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port,
            static_dir: PathBuf::from(env_or_default("STATIC_DIR", "./public")),
            max_body_bytes: parse_env_usize("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_BODY_BYTES".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.data_file.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "DATA_FILE".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    optional_env(name).unwrap_or_else(|| default.to_string())
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_usize(name: &str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for name in [
            "DATA_FILE",
            "DB_FILE",
            "WEB_HOST",
            "WEB_PORT",
            "PORT",
            "STATIC_DIR",
            "MAX_BODY_BYTES",
        ] {
            std::env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env().unwrap();
        assert_eq!(config.data_file, PathBuf::from("./data/data.json"));
        assert_eq!(config.web_port, 3000);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_legacy_aliases() {
        clear_env();
        std::env::set_var("DB_FILE", "/tmp/legacy.json");
        std::env::set_var("PORT", "4100");
        let config = Config::from_env().unwrap();
        assert_eq!(config.data_file, PathBuf::from("/tmp/legacy.json"));
        assert_eq!(config.web_port, 4100);

        std::env::set_var("WEB_PORT", "4200");
        let config = Config::from_env().unwrap();
        assert_eq!(config.web_port, 4200);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values() {
        clear_env();
        std::env::set_var("WEB_PORT", "not-a-port");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::ParseInt { .. })
        ));
        clear_env();

        std::env::set_var("MAX_BODY_BYTES", "0");
        let config = Config::from_env().unwrap();
        assert!(config.validate().is_err());
        clear_env();
    }
}
