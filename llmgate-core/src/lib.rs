//! llmgate core library
//!
//! Provider selection, exhaustion tracking and the retry/forwarding
//! engine behind the llmgate failover gateway. The HTTP surface lives in
//! the `llmgate-server` crate; this crate is the part with state,
//! concurrency and failure handling:
//!
//! - [`providers::ProviderRegistry`] — immutable ordered provider pool
//! - [`store::ExhaustionStore`] — shared TTL flags for exhausted providers
//! - [`providers::limits`] — quota-exhaustion classification
//! - [`providers::ProviderSelector`] — round-robin cursor over the pool
//! - [`http::HttpForwarder`] — buffered and streaming outbound calls
//! - [`gateway::Gateway`] — the select/forward/classify retry loop

pub mod config;
pub mod gateway;
pub mod http;
pub mod providers;
pub mod store;

pub use crate::config::GatewayConfig;
pub use crate::gateway::{Gateway, GatewayError, RouteEvent, RouteObserver, TracingObserver};
pub use crate::http::{ForwardContext, ForwardedResponse, HttpForwarder, RelayStream};
pub use crate::providers::{Provider, ProviderRegistry, ProviderSelector};
pub use crate::store::{ExhaustionStore, MemoryExhaustionStore, RedisExhaustionStore};

/// Returns the version of the llmgate core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
