//! Retry orchestration: the forward-or-rotate control flow
//!
//! Drives the attempt loop for one inbound call: select a provider,
//! forward the request, classify the response, and either pass the
//! response through or mark the provider exhausted and rotate to the
//! next one. Attempts are bounded by the pool size.

mod events;

pub use events::{RouteEvent, RouteObserver, TracingObserver};

use crate::config::{ConnectionConfig, GatewayConfig};
use crate::http::{ForwardContext, ForwardError, ForwardedResponse, HttpForwarder, RelayStream};
use crate::providers::{is_quota_exhausted, parse_body, ProviderRegistry, ProviderSelector};
use crate::store::{ExhaustionStore, StoreError};
use futures::TryStreamExt;
use http::StatusCode;
use std::sync::Arc;
use thiserror::Error;

/// Fixed payload returned when every provider is exhausted
pub const ALL_EXHAUSTED_BODY: &str = r#"{"error":"All providers exhausted"}"#;

/// Errors surfaced by the retry loop
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No provider available at selection time, or every provider
    /// became exhausted during the retry loop. Maps to a fixed 429.
    #[error("All providers exhausted")]
    AllProvidersExhausted,

    #[error(transparent)]
    Forward(#[from] ForwardError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The failover engine for one provider pool
pub struct Gateway {
    registry: Arc<ProviderRegistry>,
    selector: ProviderSelector,
    store: Arc<dyn ExhaustionStore>,
    forwarder: HttpForwarder,
    observer: Arc<dyn RouteObserver>,
}

impl Gateway {
    /// Build a gateway over a registry and an exhaustion store
    pub fn new(
        registry: ProviderRegistry,
        store: Arc<dyn ExhaustionStore>,
        connection: &ConnectionConfig,
    ) -> Result<Self, ForwardError> {
        let registry = Arc::new(registry);
        let selector = ProviderSelector::new(Arc::clone(&registry), Arc::clone(&store));
        let forwarder = HttpForwarder::new(connection)?;

        Ok(Self {
            registry,
            selector,
            store,
            forwarder,
            observer: Arc::new(TracingObserver),
        })
    }

    /// Convenience constructor from validated configuration
    pub fn from_config(
        config: &GatewayConfig,
        store: Arc<dyn ExhaustionStore>,
    ) -> Result<Self, GatewayError> {
        let registry = ProviderRegistry::from_config(&config.providers)
            .map_err(|e| ForwardError::Client(e.to_string()))?;
        Ok(Self::new(registry, store, &config.connection)?)
    }

    /// Replace the observation hook
    pub fn with_observer(mut self, observer: Arc<dyn RouteObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Number of providers in the pool
    pub fn pool_size(&self) -> usize {
        self.registry.len()
    }

    /// Handle a buffered call: retry across providers until one returns
    /// a response that is not a quota-exhaustion signal, then pass that
    /// response through unchanged.
    pub async fn handle_buffered(
        &self,
        ctx: &ForwardContext,
    ) -> Result<ForwardedResponse, GatewayError> {
        let max_attempts = self.registry.len();

        for attempt in 1..=max_attempts {
            let Some(provider) = self.selector.next().await? else {
                break;
            };

            self.observer.on_event(&RouteEvent::AttemptStarted {
                request_id: ctx.request_id,
                provider: provider.name(),
                attempt,
            });

            let response = self.forwarder.send_buffered(&provider, ctx).await?;
            let body = parse_body(&response.body);

            if is_quota_exhausted(response.status, body.as_ref()) {
                self.store.mark_exhausted(provider.name()).await?;
                self.observer.on_event(&RouteEvent::ProviderExhausted {
                    request_id: ctx.request_id,
                    provider: provider.name(),
                });
                continue;
            }

            // Everything else passes through, including non-quota 429s
            // and upstream error statuses.
            self.observer.on_event(&RouteEvent::ResponseReturned {
                request_id: ctx.request_id,
                provider: provider.name(),
                status: response.status,
            });
            return Ok(response);
        }

        self.observer.on_event(&RouteEvent::AllProvidersExhausted {
            request_id: ctx.request_id,
        });
        Err(GatewayError::AllProvidersExhausted)
    }

    /// Handle a streaming call: one attempt, no mid-stream failover.
    ///
    /// If the first upstream response is a 429 classified as quota
    /// exhaustion, the provider is marked and the relay ends with zero
    /// bytes and no error; once a stream has been handed to the caller
    /// there is no way to retry without changing response framing. A
    /// non-exhaustion 429 has its body relayed as-is. Any other status
    /// is relayed chunk by chunk until upstream EOF or the caller
    /// disconnects (dropping the relay releases the upstream
    /// connection).
    pub async fn handle_streaming(&self, ctx: &ForwardContext) -> Result<RelayStream, GatewayError> {
        let Some(provider) = self.selector.next().await? else {
            self.observer.on_event(&RouteEvent::AllProvidersExhausted {
                request_id: ctx.request_id,
            });
            return Err(GatewayError::AllProvidersExhausted);
        };

        self.observer.on_event(&RouteEvent::AttemptStarted {
            request_id: ctx.request_id,
            provider: provider.name(),
            attempt: 1,
        });

        let response = self.forwarder.open_stream(&provider, ctx).await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = response.bytes().await.map_err(ForwardError::from)?;

            if is_quota_exhausted(status, parse_body(&body).as_ref()) {
                self.store.mark_exhausted(provider.name()).await?;
                self.observer.on_event(&RouteEvent::StreamAbandoned {
                    request_id: ctx.request_id,
                    provider: provider.name(),
                });
                return Ok(Box::pin(futures::stream::empty()));
            }

            // Transient rate limit: relay the body we already buffered
            self.observer.on_event(&RouteEvent::StreamOpened {
                request_id: ctx.request_id,
                provider: provider.name(),
                status,
            });
            return Ok(Box::pin(futures::stream::once(async move { Ok(body) })));
        }

        self.observer.on_event(&RouteEvent::StreamOpened {
            request_id: ctx.request_id,
            provider: provider.name(),
            status,
        });

        Ok(Box::pin(response.bytes_stream().map_err(ForwardError::from)))
    }
}
