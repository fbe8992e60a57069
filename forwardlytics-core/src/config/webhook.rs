//! Generic webhook integration settings.

use std::time::Duration;
use url::Url;

/// Request timeout used when none is configured.
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for forwarding identify events to an arbitrary HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSettings {
    /// Target URL. The integration is disabled while this is `None`.
    pub url: Option<Url>,
    /// HMAC secret for the `Forwardlytics-Signature` header. Unsigned when `None`.
    pub secret: Option<String>,
    pub timeout: Duration,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            url: None,
            secret: None,
            timeout: DEFAULT_WEBHOOK_TIMEOUT,
        }
    }
}
