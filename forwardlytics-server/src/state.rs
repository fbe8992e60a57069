//! Application state shared across all request handlers.

use forwardlytics_core::config::SharedIntegrationConfig;
use forwardlytics_core::dispatcher::Dispatcher;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Expected value of the API key header. Fixed for the process lifetime.
    pub api_key: Arc<str>,
    /// Forwards validated events to the registered integrations.
    pub dispatcher: Dispatcher,
    /// Integration settings (can be reloaded via SIGHUP).
    pub integrations: SharedIntegrationConfig,
}

impl AppState {
    pub fn new(
        api_key: impl Into<Arc<str>>,
        dispatcher: Dispatcher,
        integrations: SharedIntegrationConfig,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            dispatcher,
            integrations,
        }
    }
}
