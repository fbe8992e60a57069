//! Custom Axum extractors for the identify endpoint.
//!
//! Provides:
//! - `ReceivedAt` - the server-side receive stamp, taken when extraction runs.
//! - `ApiKeyAuth` - checks the `FORWARDLYTICS_API_KEY` header against the
//!   configured key.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use forwardlytics_sdk::API_KEY_HEADER;

use super::IdentifyApiError;
use crate::state::AppState;

/// Epoch seconds at which the request began processing.
///
/// List it first among a handler's arguments so the stamp precedes
/// authentication and body decoding.
pub struct ReceivedAt(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for ReceivedAt {
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ReceivedAt(time::OffsetDateTime::now_utc().unix_timestamp()))
    }
}

/// Proof that the request carried the configured API key.
///
/// A missing header, a non-UTF-8 value, and a wrong value are all rejected
/// the same way.
pub struct ApiKeyAuth;

impl FromRequestParts<AppState> for ApiKeyAuth {
    type Rejection = IdentifyApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());

        match provided {
            Some(key) if key == &*state.api_key => Ok(ApiKeyAuth),
            Some(_) => {
                tracing::warn!("Rejected request with a wrong API key");
                Err(IdentifyApiError::Unauthorized)
            }
            None => {
                tracing::warn!("Rejected request without an API key");
                Err(IdentifyApiError::Unauthorized)
            }
        }
    }
}
