//! End-to-end tests for the retry loop against mock upstreams

use bytes::Bytes;
use futures::TryStreamExt;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use llmgate_core::config::ConnectionConfig;
use llmgate_core::gateway::{Gateway, GatewayError};
use llmgate_core::http::ForwardContext;
use llmgate_core::providers::{Provider, ProviderRegistry};
use llmgate_core::store::{ExhaustionStore, MemoryExhaustionStore};
use std::sync::Arc;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_over(
    upstreams: &[(&str, &MockServer, &str)],
) -> (Gateway, Arc<MemoryExhaustionStore>) {
    let providers = upstreams
        .iter()
        .map(|(name, server, key)| Provider::new(*name, server.uri(), *key))
        .collect();
    let registry = ProviderRegistry::new(providers).unwrap();
    let store = Arc::new(MemoryExhaustionStore::new());
    let gateway = Gateway::new(
        registry,
        store.clone() as Arc<dyn ExhaustionStore>,
        &ConnectionConfig::default(),
    )
    .unwrap();
    (gateway, store)
}

fn post_ctx(body: &str) -> ForwardContext {
    ForwardContext::new(
        Method::POST,
        "/v1/chat/completions".to_string(),
        HeaderMap::new(),
        Bytes::from(body.to_string()),
    )
}

fn streaming_ctx() -> ForwardContext {
    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::ACCEPT,
        HeaderValue::from_static("text/event-stream"),
    );
    ForwardContext::new(
        Method::POST,
        "/v1/chat/completions".to_string(),
        headers,
        Bytes::from_static(b"{\"stream\":true}"),
    )
}

async fn collect(stream: llmgate_core::http::RelayStream) -> Bytes {
    let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
    chunks.concat().into()
}

#[tokio::test]
async fn test_failover_on_quota_exhaustion() {
    let p1 = MockServer::start().await;
    let p2 = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": {"message": "You exceeded your daily quota"}
        })))
        .expect(1)
        .mount(&p1)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "resp-1"})),
        )
        .expect(1)
        .mount(&p2)
        .await;

    let (gateway, store) = gateway_over(&[("p1", &p1, "sk-1"), ("p2", &p2, "sk-2")]);
    let response = gateway.handle_buffered(&post_ctx("{}")).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert!(String::from_utf8_lossy(&response.body).contains("resp-1"));
    assert!(store.is_exhausted("p1").await.unwrap());
    assert!(!store.is_exhausted("p2").await.unwrap());
}

#[tokio::test]
async fn test_authorization_replaced_per_provider() {
    let p1 = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("authorization", "Bearer sk-p1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&p1)
        .await;

    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::AUTHORIZATION,
        HeaderValue::from_static("Bearer caller-key"),
    );
    let ctx = ForwardContext::new(
        Method::POST,
        "/v1/chat/completions".to_string(),
        headers,
        Bytes::new(),
    );

    let (gateway, _store) = gateway_over(&[("p1", &p1, "sk-p1")]);
    let response = gateway.handle_buffered(&ctx).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_body_and_path_forwarded_verbatim() {
    let p1 = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string("{\"model\":\"m\"}"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&p1)
        .await;

    let (gateway, _store) = gateway_over(&[("p1", &p1, "sk-1")]);
    let response = gateway
        .handle_buffered(&post_ctx("{\"model\":\"m\"}"))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_transient_429_passes_through_without_marking() {
    let p1 = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": "Rate exceeded, retry shortly"
        })))
        .expect(1)
        .mount(&p1)
        .await;

    let (gateway, store) = gateway_over(&[("p1", &p1, "sk-1")]);
    let response = gateway.handle_buffered(&post_ctx("{}")).await.unwrap();

    // Not classified as exhaustion: relayed as-is, provider stays in rotation
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(String::from_utf8_lossy(&response.body).contains("Rate exceeded"));
    assert!(!store.is_exhausted("p1").await.unwrap());
}

#[tokio::test]
async fn test_upstream_error_statuses_pass_through() {
    let p1 = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(503).set_body_string("upstream maintenance"),
        )
        .expect(1)
        .mount(&p1)
        .await;

    let (gateway, store) = gateway_over(&[("p1", &p1, "sk-1")]);
    let response = gateway.handle_buffered(&post_ctx("{}")).await.unwrap();

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body, Bytes::from_static(b"upstream maintenance"));
    assert!(!store.is_exhausted("p1").await.unwrap());
}

#[tokio::test]
async fn test_all_providers_exhausted_during_retry_loop() {
    let p1 = MockServer::start().await;
    let p2 = MockServer::start().await;

    let quota_reply = ResponseTemplate::new(429).set_body_json(serde_json::json!({
        "error": "Billing hard limit reached"
    }));

    Mock::given(method("POST"))
        .respond_with(quota_reply.clone())
        .expect(1)
        .mount(&p1)
        .await;
    Mock::given(method("POST"))
        .respond_with(quota_reply)
        .expect(1)
        .mount(&p2)
        .await;

    let (gateway, store) = gateway_over(&[("p1", &p1, "sk-1"), ("p2", &p2, "sk-2")]);
    let result = gateway.handle_buffered(&post_ctx("{}")).await;

    assert!(matches!(result, Err(GatewayError::AllProvidersExhausted)));
    assert!(store.is_exhausted("p1").await.unwrap());
    assert!(store.is_exhausted("p2").await.unwrap());
}

#[tokio::test]
async fn test_known_exhausted_providers_get_no_outbound_call() {
    let p1 = MockServer::start().await;
    let p2 = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&p1)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&p2)
        .await;

    let (gateway, store) = gateway_over(&[("p1", &p1, "sk-1"), ("p2", &p2, "sk-2")]);
    store.mark_exhausted("p1").await.unwrap();
    store.mark_exhausted("p2").await.unwrap();

    let result = gateway.handle_buffered(&post_ctx("{}")).await;
    assert!(matches!(result, Err(GatewayError::AllProvidersExhausted)));
}

#[tokio::test]
async fn test_streaming_relay_delivers_upstream_bytes() {
    let p1 = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_raw(
                    "data: a\n\ndata: b\n\ndata: [DONE]\n\n",
                    "text/event-stream",
                ),
        )
        .expect(1)
        .mount(&p1)
        .await;

    let (gateway, _store) = gateway_over(&[("p1", &p1, "sk-1")]);
    let stream = gateway.handle_streaming(&streaming_ctx()).await.unwrap();

    let body = collect(stream).await;
    assert_eq!(
        body,
        Bytes::from_static(b"data: a\n\ndata: b\n\ndata: [DONE]\n\n")
    );
}

#[tokio::test]
async fn test_streaming_exhaustion_yields_empty_relay_and_marks_provider() {
    let p1 = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": "Daily quota consumed"
        })))
        .expect(1)
        .mount(&p1)
        .await;

    let (gateway, store) = gateway_over(&[("p1", &p1, "sk-1")]);
    let stream = gateway.handle_streaming(&streaming_ctx()).await.unwrap();

    // The relay completes with zero bytes and no error
    let body = collect(stream).await;
    assert!(body.is_empty());
    assert!(store.is_exhausted("p1").await.unwrap());
}

#[tokio::test]
async fn test_streaming_transient_429_relays_buffered_body() {
    let p1 = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": "Too many concurrent requests"
        })))
        .expect(1)
        .mount(&p1)
        .await;

    let (gateway, store) = gateway_over(&[("p1", &p1, "sk-1")]);
    let stream = gateway.handle_streaming(&streaming_ctx()).await.unwrap();

    let body = collect(stream).await;
    assert!(String::from_utf8_lossy(&body).contains("Too many concurrent requests"));
    assert!(!store.is_exhausted("p1").await.unwrap());
}

#[tokio::test]
async fn test_streaming_with_all_providers_exhausted() {
    let p1 = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&p1)
        .await;

    let (gateway, store) = gateway_over(&[("p1", &p1, "sk-1")]);
    store.mark_exhausted("p1").await.unwrap();

    let result = gateway.handle_streaming(&streaming_ctx()).await;
    assert!(matches!(result, Err(GatewayError::AllProvidersExhausted)));
}

#[tokio::test]
async fn test_rotation_continues_across_requests() {
    let p1 = MockServer::start().await;
    let p2 = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("from-p1"))
        .expect(1)
        .mount(&p1)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("from-p2"))
        .expect(1)
        .mount(&p2)
        .await;

    let (gateway, _store) = gateway_over(&[("p1", &p1, "sk-1"), ("p2", &p2, "sk-2")]);

    let first = gateway.handle_buffered(&post_ctx("{}")).await.unwrap();
    let second = gateway.handle_buffered(&post_ctx("{}")).await.unwrap();

    assert_eq!(first.body, Bytes::from_static(b"from-p1"));
    assert_eq!(second.body, Bytes::from_static(b"from-p2"));
}

#[tokio::test]
async fn test_connect_failure_surfaces_as_forward_error() {
    // Reserved port with nothing listening
    let registry = ProviderRegistry::new(vec![Provider::new(
        "dead",
        "http://127.0.0.1:9",
        "sk-1",
    )])
    .unwrap();
    let store = Arc::new(MemoryExhaustionStore::new());
    let gateway = Gateway::new(
        registry,
        store.clone() as Arc<dyn ExhaustionStore>,
        &ConnectionConfig {
            connect_timeout_ms: 500,
            ..ConnectionConfig::default()
        },
    )
    .unwrap();

    let result = gateway.handle_buffered(&post_ctx("{}")).await;
    assert!(matches!(result, Err(GatewayError::Forward(_))));
    // Transport failures never mark a provider exhausted
    assert!(!store.is_exhausted("dead").await.unwrap());
}
