//! Round-robin provider selection
//!
//! The selector owns the shared rotation cursor. Every probe claims the
//! current position and advances the cursor by exactly one (wrapping) in
//! a single atomic step, so concurrent callers never observe the same
//! position and fairness holds across interleaved calls. A full scan
//! that finds every provider exhausted leaves the cursor displaced by
//! exactly the pool size, i.e. back where it started.

use crate::providers::registry::{Provider, ProviderRegistry};
use crate::store::{ExhaustionStore, StoreError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Stateful round-robin cursor over the registry
pub struct ProviderSelector {
    registry: Arc<ProviderRegistry>,
    store: Arc<dyn ExhaustionStore>,
    cursor: AtomicUsize,
}

impl ProviderSelector {
    pub fn new(registry: Arc<ProviderRegistry>, store: Arc<dyn ExhaustionStore>) -> Self {
        Self {
            registry,
            store,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Claim the current rotation position and advance the cursor by one,
    /// wrapping within `[0, pool size)`.
    fn advance(&self) -> usize {
        let len = self.registry.len();
        loop {
            let current = self.cursor.load(Ordering::Acquire);
            let next = (current + 1) % len;
            if self
                .cursor
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return current;
            }
        }
    }

    /// Return the next non-exhausted provider, or `None` when a full scan
    /// finds every provider exhausted.
    ///
    /// Exhaustion is a soft signal: a provider marked by a concurrent
    /// call may still be selected here. That race is tolerated; the
    /// worst case is one wasted upstream attempt.
    pub async fn next(&self) -> Result<Option<Provider>, StoreError> {
        for _ in 0..self.registry.len() {
            let position = self.advance();
            // Position is always within the registry after a wrapped advance
            let Some(provider) = self.registry.get(position) else {
                continue;
            };

            if !self.store.is_exhausted(provider.name()).await? {
                return Ok(Some(provider.clone()));
            }

            debug!(provider = provider.name(), "skipping exhausted provider");
        }

        Ok(None)
    }

    /// Current cursor position; exposed for inspection in tests
    pub fn cursor_position(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }
}
