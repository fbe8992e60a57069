//! TOML file configuration structures.
//!
//! These structs directly map to the `forwardlytics.toml` file format. Every
//! section is optional; an absent integration section leaves that
//! integration disabled.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub integrations: IntegrationsConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:3000").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:3000".parse().expect("valid default address")
}

/// The `[integrations]` table, one sub-table per integration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrationsConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub mixpanel: MixpanelConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixpanelConfig {
    /// Project token; leave unset to disable the integration.
    pub token: Option<String>,
    /// Ingestion API root, e.g. `https://api-eu.mixpanel.com` for EU residency.
    #[serde(default = "default_mixpanel_api_url")]
    pub api_url: Url,
}

impl Default for MixpanelConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_mixpanel_api_url(),
        }
    }
}

fn default_mixpanel_api_url() -> Url {
    Url::parse("https://api.mixpanel.com").expect("valid default url")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Target URL; leave unset to disable the integration.
    pub url: Option<Url>,
    /// Optional HMAC secret for signing deliveries.
    pub secret: Option<String>,
    #[serde(default = "default_webhook_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            secret: None,
            timeout_secs: default_webhook_timeout_secs(),
        }
    }
}

fn default_webhook_timeout_secs() -> u64 {
    10
}
