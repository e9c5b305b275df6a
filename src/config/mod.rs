use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::logger::Environment;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing-subscriber output: `pretty` or `json`.
    pub format: String,
    /// Request log sink: `console` or `tracing`.
    pub request_log: String,
    pub color: bool,
    pub trust_proxy: bool,
}

impl AppConfig {
    /// Defaults, then `$CONFIG_PATH`, then `SPORTZY_*` variables, then the
    /// `HOST`, `PORT`, `APP_ENV` and `LOG_FORMAT` overrides.
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut builder = Self::builder(&config_path)?;

        if let Ok(host) = std::env::var("HOST") {
            builder = builder.set_override("server.host", host)?;
        }
        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port.parse::<u16>()?)?;
        }
        if let Ok(environment) = std::env::var("APP_ENV") {
            builder = builder.set_override("environment", environment)?;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            builder = builder.set_override("logging.format", format)?;
        }

        let config: AppConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Defaults, the file at `config_path` if it exists, and `SPORTZY_*` variables.
    pub fn load_from(config_path: &str) -> Result<Self> {
        let config: AppConfig = Self::builder(config_path)?.build()?.try_deserialize()?;
        Ok(config)
    }

    fn builder(
        config_path: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let builder = config::Config::builder()
            .set_default("environment", "production")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.timeout_seconds", 30)?
            .set_default("logging.format", "pretty")?
            .set_default("logging.request_log", "console")?
            .set_default("logging.color", true)?
            .set_default("logging.trust_proxy", false)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SPORTZY").separator("__"));

        Ok(builder)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                timeout_seconds: 30,
            },
            logging: LoggingConfig {
                format: "pretty".to_string(),
                request_log: "console".to_string(),
                color: true,
                trust_proxy: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{CapturedOutput, Logger};
    use std::sync::Arc;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load_from("does/not/exist.yaml").unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.timeout_seconds, 30);
        assert_eq!(config.logging.request_log, "console");
        assert!(config.logging.color);
        assert!(!config.logging.trust_proxy);
    }

    #[test]
    fn test_yaml_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("sportzy-{}.yaml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            "environment: staging\nserver:\n  port: 9100\nlogging:\n  color: false\n  trust_proxy: true\n",
        )
        .unwrap();

        let config = AppConfig::load_from(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.logging.color);
        assert!(config.logging.trust_proxy);
    }

    #[test]
    fn test_unset_mode_disables_debug() {
        let output = CapturedOutput::new();
        let config = AppConfig::load_from("does/not/exist.yaml").unwrap();
        let logger = Logger::with_output(config.environment, false, Arc::new(output.clone()));

        logger.debug("hidden");
        assert!(output.lines().is_empty());
        assert_eq!(AppConfig::default().environment, Environment::Production);
    }

    #[test]
    fn test_development_mode_from_file() {
        let path = std::env::temp_dir().join(format!("sportzy-{}.yaml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "environment: development\n").unwrap();

        let config = AppConfig::load_from(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(AppConfig::default().bind_address(), "0.0.0.0:8000");
    }
}
