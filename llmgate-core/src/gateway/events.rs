//! Routing observation events
//!
//! The retry loop reports what it does through an injectable observer,
//! so quiet production logging and verbose debugging share one code
//! path instead of duplicating the forwarding logic.

use http::StatusCode;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One step of a routed call, as seen by the retry loop
#[derive(Debug)]
pub enum RouteEvent<'a> {
    /// An attempt against a provider is starting
    AttemptStarted {
        request_id: Uuid,
        provider: &'a str,
        attempt: usize,
    },

    /// A provider signaled quota exhaustion and was marked
    ProviderExhausted {
        request_id: Uuid,
        provider: &'a str,
    },

    /// A buffered response is being returned to the caller
    ResponseReturned {
        request_id: Uuid,
        provider: &'a str,
        status: StatusCode,
    },

    /// A streaming relay was opened to the caller
    StreamOpened {
        request_id: Uuid,
        provider: &'a str,
        status: StatusCode,
    },

    /// A streaming call was abandoned with an empty body after a
    /// first-response exhaustion signal
    StreamAbandoned {
        request_id: Uuid,
        provider: &'a str,
    },

    /// Every provider in the pool was exhausted
    AllProvidersExhausted { request_id: Uuid },
}

/// Observer hook for routing events
pub trait RouteObserver: Send + Sync {
    fn on_event(&self, event: &RouteEvent<'_>);
}

/// Default observer that emits structured log events
pub struct TracingObserver;

impl RouteObserver for TracingObserver {
    fn on_event(&self, event: &RouteEvent<'_>) {
        match event {
            RouteEvent::AttemptStarted {
                request_id,
                provider,
                attempt,
            } => {
                debug!(request_id = %request_id, provider, attempt, "attempting provider");
            }
            RouteEvent::ProviderExhausted {
                request_id,
                provider,
            } => {
                warn!(request_id = %request_id, provider, "provider exhausted, rotating");
            }
            RouteEvent::ResponseReturned {
                request_id,
                provider,
                status,
            } => {
                info!(
                    request_id = %request_id,
                    provider,
                    status = status.as_u16(),
                    "returning upstream response"
                );
            }
            RouteEvent::StreamOpened {
                request_id,
                provider,
                status,
            } => {
                info!(
                    request_id = %request_id,
                    provider,
                    status = status.as_u16(),
                    "relaying upstream stream"
                );
            }
            RouteEvent::StreamAbandoned {
                request_id,
                provider,
            } => {
                warn!(
                    request_id = %request_id,
                    provider,
                    "stream abandoned after exhaustion signal"
                );
            }
            RouteEvent::AllProvidersExhausted { request_id } => {
                warn!(request_id = %request_id, "all providers exhausted");
            }
        }
    }
}
