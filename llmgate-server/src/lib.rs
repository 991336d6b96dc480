//! HTTP surface of the llmgate failover gateway
//!
//! A single catch-all route: every inbound request is captured into a
//! forward context and handed to the core retry engine, and whatever
//! comes back is mirrored to the caller. Streaming responses are
//! relayed chunk by chunk; exhaustion of the whole pool maps to a
//! fixed 429 payload.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use http::header::{self, HeaderName};
use http::StatusCode;
use llmgate_core::gateway::{Gateway, GatewayError, ALL_EXHAUSTED_BODY};
use llmgate_core::http::{ForwardContext, ForwardedResponse, EVENT_STREAM_MEDIA_TYPE};
use std::sync::Arc;
use tracing::error;

/// Headers that describe the gateway-to-upstream connection rather than
/// the payload, never mirrored back to the caller
const HOP_BY_HOP_HEADERS: [HeaderName; 6] = [
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Build the gateway router: a catch-all forward handler on every path
pub fn app(gateway: Arc<Gateway>) -> Router {
    Router::new()
        .route("/", any(forward))
        .route("/*path", any(forward))
        .with_state(gateway)
}

async fn forward(State(gateway): State<Arc<Gateway>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "failed to read inbound request body");
            return status_response(StatusCode::BAD_REQUEST);
        }
    };

    let ctx = ForwardContext::new(parts.method, path_and_query, parts.headers, body);

    if ctx.streaming {
        match gateway.handle_streaming(&ctx).await {
            Ok(stream) => streaming_response(stream),
            Err(e) => error_response(e),
        }
    } else {
        match gateway.handle_buffered(&ctx).await {
            Ok(response) => buffered_response(response),
            Err(e) => error_response(e),
        }
    }
}

/// Mirror a fully buffered upstream response: status, payload headers
/// and body, untouched
fn buffered_response(forwarded: ForwardedResponse) -> Response {
    let mut response = Response::new(Body::from(forwarded.body));
    *response.status_mut() = forwarded.status;

    let headers = response.headers_mut();
    for (name, value) in forwarded.headers.iter() {
        if HOP_BY_HOP_HEADERS.contains(name) || name == header::CONTENT_LENGTH {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    response
}

/// Wrap a relay stream as an event-stream response
fn streaming_response(stream: llmgate_core::http::RelayStream) -> Response {
    match Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, EVENT_STREAM_MEDIA_TYPE)
        .body(Body::from_stream(stream))
    {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "failed to build streaming response");
            status_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn error_response(err: GatewayError) -> Response {
    let (status, body) = match &err {
        GatewayError::AllProvidersExhausted => {
            (StatusCode::TOO_MANY_REQUESTS, ALL_EXHAUSTED_BODY.to_string())
        }
        GatewayError::Forward(e) => {
            error!(error = %e, "upstream forwarding failed");
            (
                StatusCode::BAD_GATEWAY,
                serde_json::json!({"error": e.to_string()}).to_string(),
            )
        }
        GatewayError::Store(e) => {
            error!(error = %e, "exhaustion store unavailable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({"error": e.to_string()}).to_string(),
            )
        }
    };

    match Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
    {
        Ok(response) => response,
        Err(_) => status_response(status),
    }
}

fn status_response(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}
