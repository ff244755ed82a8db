use async_trait::async_trait;

use crate::error::Result;
use crate::protocol::{self, ApiCommand};
use crate::types::DomainInfo;
use crate::xml::XmlElement;

/// TLDs known to the offline API.
pub const NULL_API_TLDS: &[&str] = &[".com", ".net", ".org", ".edu", ".gov"];

/// Access to the registrar's XML API.
#[async_trait]
pub trait DnsApi: Send + Sync {
    /// Run `command` and return its `<CommandResponse>` element.
    async fn execute(&self, command: ApiCommand, params: &[(String, String)]) -> Result<XmlElement>;

    /// Known top-level domains, dot-prefixed (`.com`, `.co.uk`, ...).
    ///
    /// Never fails; implementations fall back to a built-in list.
    async fn top_level_domains(&self) -> Vec<String>;

    /// Refetch the list of domains registered on the account.
    async fn reload(&self) -> Result<Vec<DomainInfo>>;

    /// Domains registered on the account, loading them on first use.
    async fn registered_domains(&self) -> Result<Vec<DomainInfo>>;

    /// Split `domain_name` into `(sld, tld)` using [`top_level_domains`](Self::top_level_domains).
    async fn split_domain_name(&self, domain_name: &str) -> (String, String) {
        let tlds = self.top_level_domains().await;
        protocol::split_domain_name(&tlds, domain_name)
    }
}

/// API stand-in for offline domains.
///
/// Every command answers with an empty `<CommandResponse/>`, so reads come back empty
/// and saves report that no result was returned.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullApi;

#[async_trait]
impl DnsApi for NullApi {
    async fn execute(&self, _command: ApiCommand, _params: &[(String, String)]) -> Result<XmlElement> {
        Ok(XmlElement::new("CommandResponse"))
    }

    async fn top_level_domains(&self) -> Vec<String> {
        NULL_API_TLDS.iter().map(ToString::to_string).collect()
    }

    async fn reload(&self) -> Result<Vec<DomainInfo>> {
        Ok(Vec::new())
    }

    async fn registered_domains(&self) -> Result<Vec<DomainInfo>> {
        Ok(Vec::new())
    }
}
