//! API factory functions.

use std::sync::Arc;

use crate::config::ContextConfig;
use crate::context::DnsContext;
use crate::error::Result;
use crate::traits::{DnsApi, NullApi};

/// Creates a live [`DnsApi`] from the given configuration.
///
/// The context is wrapped in `Arc<dyn DnsApi>` for easy sharing across tasks and
/// registered domains. It uses default timeouts and the process-wide rate limiter;
/// use [`DnsContext::builder`] to change either.
///
/// # Examples
///
/// ```rust,no_run
/// use namecheap_dns::{ContextConfig, create_api};
///
/// let api = create_api(ContextConfig::sandbox("api-user", "api-key", "203.0.113.7"))?;
/// # Ok::<(), namecheap_dns::NamecheapError>(())
/// ```
pub fn create_api(config: ContextConfig) -> Result<Arc<dyn DnsApi>> {
    Ok(Arc::new(DnsContext::new(config)?))
}

/// An API that never touches the network, for offline domains and tests.
pub fn offline_api() -> Arc<dyn DnsApi> {
    Arc::new(NullApi)
}
