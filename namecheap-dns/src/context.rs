//! Live API context.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::{Mutex, OnceCell};

use crate::config::ContextConfig;
use crate::domain::RegisteredDomain;
use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::protocol::{self, ApiCommand, DOMAIN_PAGE_SIZE, FALLBACK_TLDS};
use crate::rate_limit::RateLimiter;
use crate::traits::DnsApi;
use crate::types::DomainInfo;
use crate::xml::XmlElement;

/// Default wait for a call slot.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate-limited client for one set of API credentials.
///
/// Cheap to clone; clones share the HTTP client, the TLD cache and the domain list.
///
/// # Construction
///
/// ```rust,no_run
/// use namecheap_dns::{ContextConfig, DnsContext};
///
/// let config = ContextConfig::sandbox("api-user", "api-key", "203.0.113.7");
/// let context = DnsContext::new(config)?;
/// # Ok::<(), namecheap_dns::NamecheapError>(())
/// ```
#[derive(Clone)]
pub struct DnsContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    config: ContextConfig,
    endpoint: String,
    client: Client,
    limiter: Arc<RateLimiter>,
    max_wait: Duration,
    top_level: OnceCell<Vec<String>>,
    domains: Mutex<Option<Vec<DomainInfo>>>,
}

impl std::fmt::Debug for DnsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsContext")
            .field("endpoint", &self.inner.endpoint)
            .field("api_user", &self.inner.config.api_user)
            .field("max_wait", &self.inner.max_wait)
            .finish_non_exhaustive()
    }
}

/// Builder for [`DnsContext`].
pub struct DnsContextBuilder {
    config: ContextConfig,
    endpoint: Option<String>,
    limiter: Option<Arc<RateLimiter>>,
    max_wait: Duration,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl DnsContextBuilder {
    fn new(config: ContextConfig) -> Self {
        Self {
            config,
            endpoint: None,
            limiter: None,
            max_wait: DEFAULT_MAX_WAIT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Longest wait for a rate-limit call slot (default: 30s).
    #[must_use]
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Connect timeout of the HTTP client (default: 10s).
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Whole-request timeout of the HTTP client (default: 30s).
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Send requests to `endpoint` instead of `https://{api_host}/xml.response`.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Use a dedicated limiter instead of the process-wide one.
    #[must_use]
    pub fn rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Validate the configuration and build the [`DnsContext`].
    pub fn build(self) -> Result<DnsContext> {
        self.config.validate()?;
        let client = HttpUtils::build_client(self.connect_timeout, self.request_timeout)?;
        let endpoint = self.endpoint.unwrap_or_else(|| self.config.endpoint());

        Ok(DnsContext {
            inner: Arc::new(ContextInner {
                config: self.config,
                endpoint,
                client,
                limiter: self.limiter.unwrap_or_else(RateLimiter::shared),
                max_wait: self.max_wait,
                top_level: OnceCell::new(),
                domains: Mutex::new(None),
            }),
        })
    }
}

impl DnsContext {
    /// Context with default timeouts and the process-wide rate limiter.
    pub fn new(config: ContextConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: ContextConfig) -> DnsContextBuilder {
        DnsContextBuilder::new(config)
    }

    pub fn config(&self) -> &ContextConfig {
        &self.inner.config
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Registered domain named `name` (ignoring case), if the account holds it.
    pub async fn domain(&self, name: &str) -> Result<Option<RegisteredDomain>> {
        let domains = self.registered_domains().await?;
        Ok(domains
            .into_iter()
            .find(|info| info.name.eq_ignore_ascii_case(name))
            .map(|info| RegisteredDomain::new(self.api(), info)))
    }

    /// Every registered domain, each with its own record store.
    pub async fn domains(&self) -> Result<Vec<RegisteredDomain>> {
        let domains = self.registered_domains().await?;
        Ok(domains
            .into_iter()
            .map(|info| RegisteredDomain::new(self.api(), info))
            .collect())
    }

    fn api(&self) -> Arc<dyn DnsApi> {
        Arc::new(self.clone())
    }

    async fn load_domains(&self) -> Result<Vec<DomainInfo>> {
        let mut domains = Vec::new();
        let mut page = 1;
        let mut max_page = 1;
        let mut page_size = DOMAIN_PAGE_SIZE;

        while page <= max_page {
            log::debug!("[namecheap] Loading page {page} of domains");
            let params = protocol::domain_list_params(page, page_size);
            let response = self.execute(ApiCommand::GetDomainList, &params).await?;
            let Some((items, paging)) = protocol::parse_domain_page(&response)? else {
                break;
            };

            // stay consistent with the server's page size
            page_size = paging.page_size;
            max_page = paging.max_page().unwrap_or(0);
            page = paging.current_page.saturating_add(1);
            domains.extend(items);
        }

        log::info!("[namecheap] Loaded {} domains.", domains.len());
        Ok(domains)
    }

    async fn load_top_level_domains(&self) -> Vec<String> {
        let loaded = match self.execute(ApiCommand::GetTldList, &[]).await {
            Ok(response) => protocol::parse_tlds(&response),
            Err(e) => Err(e),
        };

        match loaded {
            Ok(Some(tlds)) => {
                log::debug!("[namecheap] Loaded {} top-level domains", tlds.len());
                tlds
            }
            Ok(None) => {
                log::error!("[namecheap] No TLD list in response, falling back on built-in values");
                fallback_tlds()
            }
            Err(e) => {
                log::error!("[namecheap] Failed to load TLD list ({e}), falling back on built-in values");
                fallback_tlds()
            }
        }
    }
}

fn fallback_tlds() -> Vec<String> {
    FALLBACK_TLDS.iter().map(ToString::to_string).collect()
}

#[async_trait]
impl DnsApi for DnsContext {
    async fn execute(&self, command: ApiCommand, params: &[(String, String)]) -> Result<XmlElement> {
        let inner = &self.inner;
        let form = protocol::request_form(&inner.config, command, params);

        inner
            .limiter
            .acquire(&inner.config.credential_key(), command.as_str(), inner.max_wait)
            .await?;

        let request = inner.client.post(&inner.endpoint).form(&form);
        let body = HttpUtils::execute_request(
            request,
            "POST",
            &format!("{} (Command: {command})", inner.endpoint),
            &inner.config.api_key,
        )
        .await?;

        protocol::decode_response(&body).inspect_err(|e| {
            if e.is_expected() {
                log::warn!("[namecheap] {command} failed: {e}");
            } else {
                log::error!("[namecheap] {command} failed: {e}");
            }
        })
    }

    async fn top_level_domains(&self) -> Vec<String> {
        self.inner
            .top_level
            .get_or_init(|| self.load_top_level_domains())
            .await
            .clone()
    }

    async fn reload(&self) -> Result<Vec<DomainInfo>> {
        let mut cached = self.inner.domains.lock().await;
        *cached = None;
        let domains = self.load_domains().await?;
        *cached = Some(domains.clone());
        Ok(domains)
    }

    async fn registered_domains(&self) -> Result<Vec<DomainInfo>> {
        let mut cached = self.inner.domains.lock().await;
        if let Some(domains) = cached.as_ref() {
            return Ok(domains.clone());
        }
        let domains = self.load_domains().await?;
        *cached = Some(domains.clone());
        Ok(domains)
    }
}
