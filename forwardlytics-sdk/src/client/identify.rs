use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::API_KEY_HEADER;
use crate::objects::{Event, MessageResponse};

/// Typed HTTP client for `POST /identify`.
///
/// The `receivedAt` field of submitted events is ignored by the server, which
/// stamps its own receive time.
#[derive(Debug, Clone)]
pub struct IdentifyClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl IdentifyClient {
    /// Create a new `IdentifyClient`.
    ///
    /// * `base_url` – root URL of the Forwardlytics server.
    /// * `api_key` – the shared key sent in the `FORWARDLYTICS_API_KEY` header.
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST /identify` – forward one identify event.
    pub async fn identify(&self, event: &Event) -> Result<MessageResponse, ClientError> {
        let url = self.base_url.join("/identify")?;

        let resp = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(event)
            .send()
            .await?;

        parse_response(resp).await
    }
}
