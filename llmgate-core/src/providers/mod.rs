//! Provider pool abstraction
//!
//! This module implements the provider side of the failover engine: the
//! immutable registry of upstream endpoints, the quota-exhaustion
//! classifier, and the round-robin selector that skips exhausted
//! providers.

pub mod limits;
pub mod registry;
pub mod selector;

pub use limits::{is_quota_exhausted, parse_body};
pub use registry::{Provider, ProviderRegistry, RegistryError};
pub use selector::ProviderSelector;
