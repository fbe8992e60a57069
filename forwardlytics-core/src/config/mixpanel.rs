//! Mixpanel integration settings.

use url::Url;

/// Settings for forwarding identify events as Mixpanel profile updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixpanelSettings {
    /// Project token. The integration is disabled while this is `None`.
    pub token: Option<String>,
    /// Root URL of the ingestion API.
    pub api_url: Url,
}
