//! Log integration.
//!
//! Writes every identify event to the tracing subscriber under the
//! `forwardlytics::identify` target. Never fails.

use super::{Integration, IntegrationError};
use crate::Event;
use crate::config::{ConfigStore, LogSettings};
use async_trait::async_trait;
use tracing::info;

pub struct LogIntegration {
    settings: ConfigStore<LogSettings>,
}

impl LogIntegration {
    pub const NAME: &str = "log";

    pub fn new(settings: ConfigStore<LogSettings>) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Integration for LogIntegration {
    fn enabled(&self) -> bool {
        self.settings.read().enabled
    }

    async fn identify(&self, event: &Event) -> Result<(), IntegrationError> {
        info!(
            target: "forwardlytics::identify",
            user_id = %event.user_id,
            traits = ?event.user_traits,
            timestamp = event.timestamp,
            received_at = event.received_at,
            "Identify"
        );
        Ok(())
    }
}
