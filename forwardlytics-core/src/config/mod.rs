//! Runtime configuration for the integrations.
//!
//! These types represent validated settings shared between the server and
//! the integrations. Parsing the configuration file is handled by the server
//! crate, which also pushes reloaded values into the stores.

mod config_store;
mod log;
mod mixpanel;
mod webhook;

pub use config_store::ConfigStore;
pub use self::log::LogSettings;
pub use mixpanel::MixpanelSettings;
pub use webhook::WebhookSettings;

/// A complete set of integration settings, as loaded from configuration.
#[derive(Debug, Clone)]
pub struct IntegrationConfig {
    pub log: LogSettings,
    pub mixpanel: MixpanelSettings,
    pub webhook: WebhookSettings,
}

/// Shared integration settings with a separate store for each integration.
///
/// Each integration holds a clone of its own store and reads it on every
/// dispatch, so an update takes effect on the next request.
#[derive(Clone)]
pub struct SharedIntegrationConfig {
    pub log: ConfigStore<LogSettings>,
    pub mixpanel: ConfigStore<MixpanelSettings>,
    pub webhook: ConfigStore<WebhookSettings>,
}

impl SharedIntegrationConfig {
    pub fn new(config: IntegrationConfig) -> Self {
        Self {
            log: ConfigStore::new(config.log),
            mixpanel: ConfigStore::new(config.mixpanel),
            webhook: ConfigStore::new(config.webhook),
        }
    }

    /// Replace every section (used during SIGHUP reload).
    pub fn update_all(&self, config: IntegrationConfig) {
        self.log.update(config.log);
        self.mixpanel.update(config.mixpanel);
        self.webhook.update(config.webhook);
    }
}
