//! Signing of forwarded webhook bodies.
//!
//! When the webhook integration has a secret configured, every delivery carries
//!
//! ```text
//! Forwardlytics-Signature: {unix_timestamp}.{base64_signature}
//! ```
//!
//! where the signature is `HMAC-SHA256("{timestamp}.{json_body}", secret)`.
//! Receivers check it with [`verify_body`].

/// Header name for the HMAC signature on webhook deliveries.
pub const SIGNATURE_HEADER: &str = "Forwardlytics-Signature";

/// Maximum allowed age of a signature (in seconds).
pub const MAX_SIGNATURE_AGE: i64 = 5 * 60;

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid header format")]
    InvalidFormat,
    #[error("invalid base64 encoding")]
    InvalidBase64,
    #[error("invalid signature")]
    SignatureMismatch,
    #[error("signature expired")]
    Expired,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

fn hmac_key(key: &[u8]) -> ring::hmac::Key {
    ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key)
}

/// Sign a JSON body at the given timestamp and return the header value.
pub fn sign_body_at(json: &str, timestamp: i64, key: &[u8]) -> String {
    let data = format!("{timestamp}.{json}");
    let sig = ring::hmac::sign(&hmac_key(key), data.as_bytes());
    format_signature_header(timestamp, sig.as_ref())
}

/// Sign a JSON body with the current time and return the header value.
pub fn sign_body(json: &str, key: &[u8]) -> String {
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    sign_body_at(json, now, key)
}

/// Verify a `Forwardlytics-Signature` header against the raw JSON body.
///
/// Checks the HMAC first, then that the timestamp is no older than
/// [`MAX_SIGNATURE_AGE`].
pub fn verify_body(header_value: &str, json: &str, key: &[u8]) -> Result<(), SignatureError> {
    let (timestamp, signature) = parse_signature_header(header_value)?;
    let data = format!("{timestamp}.{json}");
    ring::hmac::verify(&hmac_key(key), data.as_bytes(), &signature)?;
    check_timestamp(timestamp)
}

/// Parse a `{timestamp}.{base64}` header value into its parts.
pub fn parse_signature_header(value: &str) -> Result<(i64, Box<[u8]>), SignatureError> {
    let (timestamp, encoded) = value.split_once('.').ok_or(SignatureError::InvalidFormat)?;
    let timestamp: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::InvalidFormat)?;
    let signature = fast32::base64::RFC4648_NOPAD
        .decode_str(encoded)
        .map_err(|_| SignatureError::InvalidBase64)?
        .into_boxed_slice();
    Ok((timestamp, signature))
}

/// Format a `{timestamp}.{base64}` header value from its parts.
pub fn format_signature_header(timestamp: i64, signature: &[u8]) -> String {
    format!(
        "{}.{}",
        timestamp,
        fast32::base64::RFC4648_NOPAD.encode(signature)
    )
}

fn check_timestamp(timestamp: i64) -> Result<(), SignatureError> {
    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    if now - timestamp > MAX_SIGNATURE_AGE {
        return Err(SignatureError::Expired);
    }
    Ok(())
}
