//! Mixpanel integration.
//!
//! Turns an identify event into a People profile update: the user ID becomes
//! `$distinct_id` and the traits are applied with `$set`. Requests go to
//! `{api_url}/engage?verbose=1` so that Mixpanel reports rejected updates in
//! the response body instead of answering a bare `0`.

use super::{Integration, IntegrationError};
use crate::Event;
use crate::config::{ConfigStore, MixpanelSettings};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use url::{ParseError, Url};

pub struct MixpanelIntegration {
    settings: ConfigStore<MixpanelSettings>,
    http_client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ProfileUpdate<'a> {
    #[serde(rename = "$token")]
    token: &'a str,
    #[serde(rename = "$distinct_id")]
    distinct_id: &'a str,
    /// Milliseconds since the epoch.
    #[serde(rename = "$time")]
    time: i64,
    #[serde(rename = "$set")]
    set: &'a HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct EngageResponse {
    status: i64,
    #[serde(default)]
    error: Option<String>,
}

impl MixpanelIntegration {
    pub const NAME: &str = "mixpanel";

    pub fn new(settings: ConfigStore<MixpanelSettings>, http_client: reqwest::Client) -> Self {
        Self {
            settings,
            http_client,
        }
    }

    /// Append `engage` to the configured base, keeping any path prefix it has.
    fn engage_url(api_url: &Url) -> Result<Url, IntegrationError> {
        let mut url = api_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                IntegrationError::InvalidUrl(ParseError::RelativeUrlWithCannotBeABaseBase)
            })?
            .pop_if_empty()
            .push("engage");
        url.query_pairs_mut().append_pair("verbose", "1");
        Ok(url)
    }
}

#[async_trait]
impl Integration for MixpanelIntegration {
    fn enabled(&self) -> bool {
        self.settings.read().token.is_some()
    }

    async fn identify(&self, event: &Event) -> Result<(), IntegrationError> {
        let MixpanelSettings { token, api_url } = self.settings.snapshot();
        let token = token.ok_or(IntegrationError::NotConfigured)?;
        let url = Self::engage_url(&api_url)?;

        let updates = [ProfileUpdate {
            token: &token,
            distinct_id: &event.user_id,
            time: event.timestamp.saturating_mul(1000),
            set: &event.user_traits,
        }];

        let response = self.http_client.post(url).json(&updates).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(IntegrationError::DeliveryFailed {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EngageResponse = serde_json::from_str(&body)?;
        if parsed.status != 1 {
            return Err(IntegrationError::Rejected(
                parsed
                    .error
                    .unwrap_or_else(|| format!("status {}", parsed.status)),
            ));
        }

        debug!(user_id = %event.user_id, "Mixpanel profile updated");
        Ok(())
    }
}
