use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
};
use forwardlytics_sdk::objects::{Event, MessageResponse};
use kanau::processor::Processor;

use super::IdentifyApiError;
use super::extractors::{ApiKeyAuth, ReceivedAt};
use crate::state::AppState;

/// `POST /identify` - validate an identify event and forward it.
///
/// The body is decoded by hand rather than through `Json<Event>` so that any
/// read or decoding failure, an oversized body included, answers the same
/// generic message whatever the `Content-Type`. A `receivedAt` in the body is replaced by the server stamp
/// after decoding.
pub async fn identify(
    ReceivedAt(received_at): ReceivedAt,
    State(state): State<AppState>,
    _auth: ApiKeyAuth,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<MessageResponse>, IdentifyApiError> {
    let body = body.map_err(|e| {
        tracing::warn!(error = %e, "Failed to read request body");
        IdentifyApiError::InvalidRequest
    })?;
    let mut event: Event = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Bad request");
        IdentifyApiError::InvalidRequest
    })?;
    event.received_at = received_at;

    let missing = event.validate();
    if !missing.is_empty() {
        return Err(IdentifyApiError::MissingParameters(missing));
    }

    let summary = state
        .dispatcher
        .process(event)
        .await
        .map_err(IdentifyApiError::Dispatch)?;
    tracing::debug!(
        forwarded = ?summary.forwarded,
        skipped = ?summary.skipped,
        "Identify dispatched"
    );

    Ok(Json(MessageResponse::new(
        "Forwarding identify to integrations.",
    )))
}

#[cfg(test)]
mod tests {
    use crate::api::INVALID_CREDENTIAL_MESSAGE;
    use crate::server::build_router;
    use crate::state::AppState;
    use async_trait::async_trait;
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use forwardlytics_core::Event;
    use forwardlytics_core::config::{
        IntegrationConfig, LogSettings, MixpanelSettings, SharedIntegrationConfig,
        WebhookSettings,
    };
    use forwardlytics_core::dispatcher::Dispatcher;
    use forwardlytics_core::integrations::{Integration, IntegrationError};
    use forwardlytics_core::registry::IntegrationRegistry;
    use forwardlytics_sdk::API_KEY_HEADER;
    use forwardlytics_sdk::objects::MessageResponse;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    const KEY: &str = "test-key";

    type Calls = Arc<Mutex<Vec<(&'static str, Event)>>>;

    struct Fake {
        name: &'static str,
        enabled: bool,
        fail: bool,
        calls: Calls,
    }

    #[async_trait]
    impl Integration for Fake {
        fn enabled(&self) -> bool {
            self.enabled
        }

        async fn identify(&self, event: &Event) -> Result<(), IntegrationError> {
            self.calls.lock().unwrap().push((self.name, event.clone()));
            if self.fail {
                Err(IntegrationError::DeliveryFailed {
                    status: 503,
                    body: "unavailable".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn integration_config() -> SharedIntegrationConfig {
        SharedIntegrationConfig::new(IntegrationConfig {
            log: LogSettings::default(),
            mixpanel: MixpanelSettings {
                token: None,
                api_url: url::Url::parse("https://api.mixpanel.com").unwrap(),
            },
            webhook: WebhookSettings::default(),
        })
    }

    fn app(specs: &[(&'static str, bool, bool)]) -> (Router, Calls) {
        let calls: Calls = Arc::default();
        let mut registry = IntegrationRegistry::new();
        for &(name, enabled, fail) in specs {
            registry
                .register(
                    name,
                    Fake {
                        name,
                        enabled,
                        fail,
                        calls: calls.clone(),
                    },
                )
                .unwrap();
        }
        let state = AppState::new(
            KEY,
            Dispatcher::new(Arc::new(registry)),
            integration_config(),
        );
        (build_router(state), calls)
    }

    fn post(key: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder().method(Method::POST).uri("/identify");
        if let Some(key) = key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body: MessageResponse = serde_json::from_slice(&bytes).unwrap();
        (status, body.message)
    }

    #[tokio::test]
    async fn test_valid_event_is_forwarded() {
        let (router, calls) = app(&[("ok", true, false)]);
        let (status, message) = send(
            router,
            post(Some(KEY), r#"{"userID":"u1","timestamp":1000}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(message, "Forwarding identify to integrations.");

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.user_id, "u1");
        assert!(calls[0].1.user_traits.is_empty());
    }

    #[tokio::test]
    async fn test_missing_user_id() {
        let (router, calls) = app(&[("ok", true, false)]);
        let (status, message) = send(router, post(Some(KEY), r#"{"timestamp":1000}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Missing parameters: userID.");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_parameters_are_listed_in_order() {
        let (router, _) = app(&[]);
        let (status, message) = send(router, post(Some(KEY), r#"{"userTraits":{}}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Missing parameters: userID, timestamp.");
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let (router, calls) = app(&[("ok", true, false)]);
        let (status, message) = send(router, post(Some(KEY), "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Invalid request.");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_null_traits_are_accepted() {
        let (router, calls) = app(&[("ok", true, false)]);
        let (status, _) = send(
            router,
            post(
                Some(KEY),
                r#"{"userID":"u1","userTraits":null,"timestamp":1000}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(calls.lock().unwrap()[0].1.user_traits.is_empty());
    }

    #[tokio::test]
    async fn test_null_user_id_is_missing() {
        let (router, calls) = app(&[("ok", true, false)]);
        let (status, message) = send(
            router,
            post(Some(KEY), r#"{"userID":null,"timestamp":1000}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "Missing parameters: userID.");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_body_is_invalid_request() {
        let (router, calls) = app(&[("ok", true, false)]);
        let padding = "x".repeat(3 * 1024 * 1024);
        let body = format!(
            r#"{{"userID":"u1","timestamp":1000,"userTraits":{{"pad":"{padding}"}}}}"#
        );
        let response = router.oneshot(post(Some(KEY), &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body: MessageResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.message, "Invalid request.");
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_or_missing_key_is_unauthorized() {
        let body = r#"{"userID":"u1","timestamp":1000}"#;
        for key in [Some("nope"), Some(""), None] {
            let (router, calls) = app(&[("ok", true, false)]);
            let (status, message) = send(router, post(key, body)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, INVALID_CREDENTIAL_MESSAGE);
            assert!(calls.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_auth_is_checked_before_decoding() {
        let (router, _) = app(&[]);
        let (status, _) = send(router, post(Some("nope"), "{not json")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_client_received_at_is_overwritten() {
        let (router, calls) = app(&[("ok", true, false)]);
        let before = time::OffsetDateTime::now_utc().unix_timestamp();
        let (status, _) = send(
            router,
            post(
                Some(KEY),
                r#"{"userID":"u1","timestamp":1000,"receivedAt":7}"#,
            ),
        )
        .await;
        let after = time::OffsetDateTime::now_utc().unix_timestamp();
        assert_eq!(status, StatusCode::OK);

        let received_at = calls.lock().unwrap()[0].1.received_at;
        assert_ne!(received_at, 7);
        assert!((before..=after).contains(&received_at));
    }

    #[tokio::test]
    async fn test_integration_failure_is_500_and_stops_dispatch() {
        let (router, calls) = app(&[
            ("first", true, false),
            ("broken", true, true),
            ("last", true, false),
        ]);
        let (status, message) = send(
            router,
            post(Some(KEY), r#"{"userID":"u1","timestamp":1000}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            message,
            "Fatal error during identification with an integration (broken): delivery failed with status 503: unavailable"
        );
        let names: Vec<&str> = calls.lock().unwrap().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["first", "broken"]);
    }

    #[tokio::test]
    async fn test_disabled_integration_is_skipped() {
        let (router, calls) = app(&[("off", false, true), ("on", true, false)]);
        let (status, _) = send(
            router,
            post(Some(KEY), r#"{"userID":"u1","timestamp":1000}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = calls.lock().unwrap().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["on"]);
    }

    #[tokio::test]
    async fn test_get_is_not_found() {
        let (router, calls) = app(&[("ok", true, false)]);
        let request = Request::builder()
            .method(Method::GET)
            .uri("/identify")
            .header(API_KEY_HEADER, KEY)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let (router, _) = app(&[]);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/track")
            .header(API_KEY_HEADER, KEY)
            .body(Body::from("{}"))
            .unwrap();
        let (status, message) = send(router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "Not found.");
    }
}
