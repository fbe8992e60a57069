//! Configuration module for forwardlytics-server.
//!
//! Handles loading configuration from the TOML file and CLI overrides, and
//! converting it into the validated settings the integrations read.

pub mod file;

use crate::config::file::{FileConfig, IntegrationsConfig};
use forwardlytics_core::config::{
    IntegrationConfig, LogSettings, MixpanelSettings, WebhookSettings,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration result containing all parts.
#[derive(Debug)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub integrations: IntegrationConfig,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// A missing file is not an error: every integration stays disabled and
    /// the server still answers requests.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let mut file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str::<FileConfig>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %self.config_path.display(),
                    "Config file not found, all integrations disabled"
                );
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config.integrations)?;

        Ok(LoadedConfig {
            listen: file_config.server.listen,
            integrations: convert_integrations(file_config.integrations),
        })
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }
}

fn validate(config: &IntegrationsConfig) -> Result<(), ConfigError> {
    if let Some(url) = &config.webhook.url {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "webhook url {url} must use http or https"
            )));
        }
    }
    if config.webhook.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "webhook timeout_secs must be greater than zero".to_string(),
        ));
    }
    if config
        .mixpanel
        .token
        .as_deref()
        .is_some_and(|token| token.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "mixpanel token must not be blank".to_string(),
        ));
    }
    Ok(())
}

fn convert_integrations(config: IntegrationsConfig) -> IntegrationConfig {
    IntegrationConfig {
        log: LogSettings {
            enabled: config.log.enabled,
        },
        mixpanel: MixpanelSettings {
            token: config.mixpanel.token,
            api_url: config.mixpanel.api_url,
        },
        webhook: WebhookSettings {
            url: config.webhook.url,
            secret: config.webhook.secret,
            timeout: Duration::from_secs(config.webhook.timeout_secs),
        },
    }
}
