//! HTTP forwarding layer
//!
//! Carries one inbound request to one upstream provider: the request
//! context captured at the boundary, the buffered response shape, and
//! the shared-client forwarder that performs the outbound call in
//! buffered or streaming mode.

pub mod client;
pub mod error;

pub use client::HttpForwarder;
pub use error::ForwardError;

use bytes::Bytes;
use futures::Stream;
use http::{header, HeaderMap, Method, StatusCode};
use std::pin::Pin;
use uuid::Uuid;

/// Exact `Accept` value that switches an inbound call into streaming
/// relay mode
pub const EVENT_STREAM_MEDIA_TYPE: &str = "text/event-stream";

/// Byte stream relayed from an upstream response to the inbound caller
pub type RelayStream = Pin<Box<dyn Stream<Item = Result<Bytes, ForwardError>> + Send>>;

/// Per-call request context, captured once at the inbound boundary
#[derive(Debug, Clone)]
pub struct ForwardContext {
    /// Inbound method, reused verbatim for the outbound call
    pub method: Method,

    /// Original path plus query string, appended to the provider base URL
    pub path_and_query: String,

    /// Inbound headers with `Host` stripped; `Authorization` is replaced
    /// per attempt by the forwarder
    pub headers: HeaderMap,

    /// Inbound body bytes
    pub body: Bytes,

    /// Correlation id carried through log events for this call
    pub request_id: Uuid,

    /// Whether the caller asked for an event-stream response
    pub streaming: bool,
}

impl ForwardContext {
    /// Build a context from the inbound request parts.
    ///
    /// Strips the `Host` header and detects streaming mode from an exact
    /// `Accept: text/event-stream` match.
    pub fn new(method: Method, path_and_query: String, mut headers: HeaderMap, body: Bytes) -> Self {
        headers.remove(header::HOST);

        let streaming = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == EVENT_STREAM_MEDIA_TYPE)
            .unwrap_or(false);

        Self {
            method,
            path_and_query,
            headers,
            body,
            request_id: Uuid::new_v4(),
            streaming,
        }
    }
}

/// Complete upstream response, fully received
#[derive(Debug)]
pub struct ForwardedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}
