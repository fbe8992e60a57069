//! Downstream integrations.
//!
//! Every target an identify event can be forwarded to implements
//! [`Integration`]. The dispatcher only sees the trait; which targets exist is
//! decided by the registration list in [`default_registry`].
//!
//! - `log`: records the event through `tracing`
//! - `mixpanel`: updates the user's Mixpanel profile
//! - `webhook`: POSTs the event JSON to a configured URL

pub mod log;
pub mod mixpanel;
pub mod webhook;

pub use self::log::LogIntegration;
pub use mixpanel::MixpanelIntegration;
pub use webhook::WebhookIntegration;

use crate::Event;
use crate::config::SharedIntegrationConfig;
use crate::registry::{IntegrationRegistry, RegistryError};
use async_trait::async_trait;
use thiserror::Error;

/// Errors an integration can report while forwarding an event.
///
/// Any of these aborts the dispatch of the current request.
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The target answered with a non-success status
    #[error("delivery failed with status {status}: {body}")]
    DeliveryFailed { status: u16, body: String },

    /// The target accepted the request but refused the update
    #[error("rejected by target: {0}")]
    Rejected(String),

    /// Payload serialization error
    #[error("payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Endpoint URL could not be built
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Settings were removed between the enabled check and the forward
    #[error("integration is not configured")]
    NotConfigured,
}

/// A downstream target for identify events.
#[async_trait]
pub trait Integration: Send + Sync {
    /// Whether this integration is currently configured to receive events.
    ///
    /// Checked on every dispatch; must not have side effects.
    fn enabled(&self) -> bool;

    /// Forward one event to the target.
    async fn identify(&self, event: &Event) -> Result<(), IntegrationError>;
}

/// Build the registry of every integration this server ships with.
///
/// Registration order is the dispatch order.
pub fn default_registry(
    config: &SharedIntegrationConfig,
    http_client: reqwest::Client,
) -> Result<IntegrationRegistry, RegistryError> {
    let mut registry = IntegrationRegistry::new();
    registry.register(LogIntegration::NAME, LogIntegration::new(config.log.clone()))?;
    registry.register(
        MixpanelIntegration::NAME,
        MixpanelIntegration::new(config.mixpanel.clone(), http_client.clone()),
    )?;
    registry.register(
        WebhookIntegration::NAME,
        WebhookIntegration::new(config.webhook.clone(), http_client),
    )?;
    Ok(registry)
}
