//! HTTP client for the Forwardlytics identify API.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.

mod identify;

pub use identify::IdentifyClient;

use reqwest::StatusCode;

use crate::objects::MessageResponse;

/// Errors produced by the SDK HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("api error: status {status}, message: {message}")]
    Api { status: StatusCode, message: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Turn a server response into its `message`, or an [`ClientError::Api`].
///
/// Error bodies that are not the usual `{"message": ...}` object (a proxy
/// page, for instance) are carried through verbatim.
async fn parse_response(resp: reqwest::Response) -> Result<MessageResponse, ClientError> {
    let status = resp.status();
    let bytes = resp.bytes().await?;
    if !status.is_success() {
        let message = match serde_json::from_slice::<MessageResponse>(&bytes) {
            Ok(body) => body.message,
            Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
        };
        return Err(ClientError::Api { status, message });
    }
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}
