//! Identify API.
//!
//! # Endpoints
//!
//! - `POST /identify` – validate an identify event and forward it to every
//!   enabled integration
//!
//! Any other method on `/identify`, and any unknown path, answers 404.

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
use forwardlytics_core::dispatcher::DispatchError;
use forwardlytics_sdk::objects::{MessageResponse, MissingParameters};

use crate::state::AppState;

mod extractors;
mod identify;

/// Body of the 401 answer.
pub const INVALID_CREDENTIAL_MESSAGE: &str =
    "Invalid request credential. The required header must be specified, with the proper credential value.";

/// Build the identify API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/identify", post(identify::identify).fallback(not_found))
}

/// Fallback for unmatched paths and methods.
pub async fn not_found() -> IdentifyApiError {
    IdentifyApiError::NotFound
}

/// Errors that can occur while handling an identify request.
#[derive(Debug)]
pub enum IdentifyApiError {
    /// The API key header was absent or wrong.
    Unauthorized,
    /// The body was not a decodable event.
    InvalidRequest,
    /// The event lacks required fields.
    MissingParameters(MissingParameters),
    /// An integration failed; the remaining ones were not contacted.
    Dispatch(DispatchError),
    NotFound,
}

impl IntoResponse for IdentifyApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            IdentifyApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, INVALID_CREDENTIAL_MESSAGE.to_string())
            }
            IdentifyApiError::InvalidRequest => {
                (StatusCode::BAD_REQUEST, "Invalid request.".to_string())
            }
            IdentifyApiError::MissingParameters(missing) => (
                StatusCode::BAD_REQUEST,
                format!("Missing parameters: {}.", missing.join(", ")),
            ),
            IdentifyApiError::Dispatch(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            IdentifyApiError::NotFound => (StatusCode::NOT_FOUND, "Not found.".to_string()),
        };
        (status, Json(MessageResponse::new(message))).into_response()
    }
}
