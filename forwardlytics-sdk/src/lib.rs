//! Shared types for Forwardlytics.
//!
//! Holds the identify [`objects::Event`] wire format and its validation rule,
//! the request/response header names, webhook body signing, and (behind the
//! `client` feature) a typed HTTP client for the identify endpoint.

#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
pub mod signature;

/// Header carrying the shared API key on every identify request.
pub const API_KEY_HEADER: &str = "FORWARDLYTICS_API_KEY";
