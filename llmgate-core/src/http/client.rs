//! Outbound request forwarder built on a shared reqwest client

use crate::config::ConnectionConfig;
use crate::http::{ForwardContext, ForwardError, ForwardedResponse};
use crate::providers::Provider;
use http::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;

/// Default user agent
const USER_AGENT: &str = concat!("llmgate/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP forwarder with connection pooling.
///
/// Performs the outbound half of one attempt: copies method, path,
/// query, headers and body from the context, replaces `Authorization`
/// with the chosen provider's credential, and either buffers the full
/// response or hands back the open response for streaming relay. The
/// forwarder never touches the exhaustion store; interpreting the
/// response is the retry loop's job.
#[derive(Clone)]
pub struct HttpForwarder {
    client: Client,
}

impl HttpForwarder {
    /// Create a forwarder from connection settings.
    ///
    /// No total request timeout is applied unless configured: streaming
    /// relays can legitimately stay open for a long time.
    pub fn new(connection: &ConnectionConfig) -> Result<Self, ForwardError> {
        let mut builder = ClientBuilder::new()
            .pool_max_idle_per_host(connection.max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_millis(connection.connect_timeout_ms))
            .user_agent(USER_AGENT);

        if let Some(timeout_ms) = connection.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        let client = builder
            .build()
            .map_err(|e| ForwardError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Build the outbound request for one attempt against one provider
    fn build_request(
        &self,
        provider: &Provider,
        ctx: &ForwardContext,
    ) -> Result<reqwest::RequestBuilder, ForwardError> {
        let url = format!("{}{}", provider.base_url(), ctx.path_and_query);

        let mut headers = ctx.headers.clone();
        let bearer = format!("Bearer {}", provider.api_key().expose_secret());
        let value = HeaderValue::from_str(&bearer).map_err(|_| ForwardError::InvalidCredential {
            provider: provider.name().to_string(),
        })?;
        headers.insert(AUTHORIZATION, value);

        Ok(self
            .client
            .request(ctx.method.clone(), url)
            .headers(headers)
            .body(ctx.body.clone()))
    }

    /// Issue the outbound call and buffer the complete response
    pub async fn send_buffered(
        &self,
        provider: &Provider,
        ctx: &ForwardContext,
    ) -> Result<ForwardedResponse, ForwardError> {
        debug!(
            provider = provider.name(),
            method = %ctx.method,
            path = %ctx.path_and_query,
            request_id = %ctx.request_id,
            "forwarding buffered request"
        );

        let response = self.build_request(provider, ctx)?.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        debug!(
            provider = provider.name(),
            status = status.as_u16(),
            request_id = %ctx.request_id,
            "received buffered response"
        );

        Ok(ForwardedResponse {
            status,
            headers,
            body,
        })
    }

    /// Open the outbound call without consuming the body, for streaming
    /// relay. Returns as soon as the response head arrives.
    pub async fn open_stream(
        &self,
        provider: &Provider,
        ctx: &ForwardContext,
    ) -> Result<reqwest::Response, ForwardError> {
        debug!(
            provider = provider.name(),
            method = %ctx.method,
            path = %ctx.path_and_query,
            request_id = %ctx.request_id,
            "opening streaming request"
        );

        let response = self.build_request(provider, ctx)?.send().await?;
        Ok(response)
    }
}
