//! Fan-out of identify events to the registered integrations.
//!
//! Integrations are visited one at a time in registration order. Disabled
//! ones are skipped; the first enabled one that fails ends the dispatch and
//! nothing after it is contacted.

use crate::Event;
use crate::integrations::IntegrationError;
use crate::registry::IntegrationRegistry;
use kanau::processor::Processor;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// An enabled integration failed to accept the event.
#[derive(Debug, Error)]
#[error("Fatal error during identification with an integration ({integration}): {source}")]
pub struct DispatchError {
    pub integration: String,
    #[source]
    pub source: IntegrationError,
}

/// Which integrations saw the event during a successful dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub forwarded: Vec<String>,
    pub skipped: Vec<String>,
}

/// Forwards events to every enabled integration of a registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<IntegrationRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<IntegrationRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &IntegrationRegistry {
        &self.registry
    }

    /// Forward `event` to each enabled integration, in registration order.
    #[tracing::instrument(skip_all, fields(user_id = %event.user_id))]
    pub async fn dispatch(&self, event: &Event) -> Result<DispatchSummary, DispatchError> {
        let mut summary = DispatchSummary::default();

        for (name, integration) in self.registry.iter() {
            if !integration.enabled() {
                debug!(integration = name, "Integration disabled, skipping");
                summary.skipped.push(name.to_owned());
                continue;
            }

            info!(integration = name, "Forwarding identify");
            if let Err(source) = integration.identify(event).await {
                let err = DispatchError {
                    integration: name.to_owned(),
                    source,
                };
                error!(error = %err, "Dispatch aborted");
                return Err(err);
            }
            summary.forwarded.push(name.to_owned());
        }

        Ok(summary)
    }
}

impl Processor<Event> for Dispatcher {
    type Output = DispatchSummary;
    type Error = DispatchError;

    async fn process(&self, event: Event) -> Result<DispatchSummary, DispatchError> {
        self.dispatch(&event).await
    }
}
