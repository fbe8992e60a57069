//! Webhook integration.
//!
//! POSTs every identify event, as JSON and including the server's
//! `receivedAt` stamp, to a configured URL. With a secret configured the body
//! is signed into the `Forwardlytics-Signature` header (see
//! [`forwardlytics_sdk::signature`]).
//!
//! Any non-2xx answer is a delivery failure.

use super::{Integration, IntegrationError};
use crate::Event;
use crate::config::{ConfigStore, WebhookSettings};
use async_trait::async_trait;
use forwardlytics_sdk::signature::{SIGNATURE_HEADER, sign_body};
use tracing::debug;

pub struct WebhookIntegration {
    settings: ConfigStore<WebhookSettings>,
    http_client: reqwest::Client,
}

impl WebhookIntegration {
    pub const NAME: &str = "webhook";

    pub fn new(settings: ConfigStore<WebhookSettings>, http_client: reqwest::Client) -> Self {
        Self {
            settings,
            http_client,
        }
    }
}

#[async_trait]
impl Integration for WebhookIntegration {
    fn enabled(&self) -> bool {
        self.settings.read().url.is_some()
    }

    async fn identify(&self, event: &Event) -> Result<(), IntegrationError> {
        let WebhookSettings {
            url,
            secret,
            timeout,
        } = self.settings.snapshot();
        let url = url.ok_or(IntegrationError::NotConfigured)?;

        let body = serde_json::to_string(event)?;

        let mut request = self
            .http_client
            .post(url.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(timeout);

        if let Some(secret) = secret {
            request = request.header(SIGNATURE_HEADER, sign_body(&body, secret.as_bytes()));
        }

        let response = request.body(body).send().await?;
        let status = response.status();

        if status.is_success() {
            debug!(url = %url, status = %status, "Webhook delivered");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(IntegrationError::DeliveryFailed {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
    use forwardlytics_sdk::signature::verify_body;
    use std::sync::{Arc, Mutex};
    use url::Url;

    type Received = Arc<Mutex<Vec<(HeaderMap, String)>>>;

    async fn receive(
        State((received, status)): State<(Received, StatusCode)>,
        headers: HeaderMap,
        body: String,
    ) -> (StatusCode, &'static str) {
        received.lock().unwrap().push((headers, body));
        (status, "receiver says no")
    }

    async fn spawn_receiver(status: StatusCode) -> (Url, Received) {
        let received: Received = Arc::default();
        let router = Router::new()
            .route("/hook", post(receive))
            .with_state((received.clone(), status));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (Url::parse(&format!("http://{addr}/hook")).unwrap(), received)
    }

    fn integration(url: Option<Url>, secret: Option<&str>) -> WebhookIntegration {
        WebhookIntegration::new(
            ConfigStore::new(WebhookSettings {
                url,
                secret: secret.map(str::to_string),
                ..Default::default()
            }),
            reqwest::Client::new(),
        )
    }

    fn event() -> Event {
        let mut event = Event::new("u1", 1000).with_trait("plan", "pro");
        event.received_at = 1001;
        event
    }

    #[test]
    fn test_disabled_without_url() {
        assert!(!integration(None, None).enabled());
    }

    #[tokio::test]
    async fn test_identify_without_url_is_not_configured() {
        let err = integration(None, None).identify(&event()).await.unwrap_err();
        assert!(matches!(err, IntegrationError::NotConfigured));
    }

    #[tokio::test]
    async fn test_posts_signed_event_json() {
        let (url, received) = spawn_receiver(StatusCode::OK).await;
        let hook = integration(Some(url), Some("s3cret"));
        assert!(hook.enabled());

        hook.identify(&event()).await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        let (headers, body) = &received[0];
        let forwarded: Event = serde_json::from_str(body).unwrap();
        assert_eq!(forwarded, event());

        let signature = headers
            .get(SIGNATURE_HEADER)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(verify_body(signature, body, b"s3cret").is_ok());
    }

    #[tokio::test]
    async fn test_unsigned_without_secret() {
        let (url, received) = spawn_receiver(StatusCode::NO_CONTENT).await;
        integration(Some(url), None)
            .identify(&event())
            .await
            .unwrap();
        let received = received.lock().unwrap();
        assert!(received[0].0.get(SIGNATURE_HEADER).is_none());
    }

    #[tokio::test]
    async fn test_non_success_status_is_delivery_failure() {
        let (url, _) = spawn_receiver(StatusCode::BAD_GATEWAY).await;
        let err = integration(Some(url), None)
            .identify(&event())
            .await
            .unwrap_err();
        match err {
            IntegrationError::DeliveryFailed { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "receiver says no");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
