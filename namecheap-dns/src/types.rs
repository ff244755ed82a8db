use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One `<Error Number="...">message</Error>` entry from an API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorEntry {
    /// Numeric error code (`0` when the attribute is absent or not numeric).
    pub number: i32,
    /// Trimmed element content.
    pub message: String,
}

/// Metadata of a domain registered on the account, as returned by `domains.getList`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainInfo {
    /// Fully qualified domain name (e.g. `example.com`).
    pub name: String,
    /// Registration expiry date, when the service reports one.
    pub expires: Option<NaiveDate>,
    pub is_expired: bool,
    pub auto_renew: bool,
    /// Whether the domain uses the registrar's own name servers.
    pub is_our_dns: bool,
}

impl DomainInfo {
    /// Metadata for a domain that is not backed by a listing (offline use).
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expires: None,
            is_expired: false,
            auto_renew: false,
            is_our_dns: false,
        }
    }
}

/// Paging block of a `domains.getList` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    pub total_items: u32,
    pub page_size: u32,
    pub current_page: u32,
}

impl Paging {
    /// Last page number, or `None` when the page size is zero.
    pub fn max_page(&self) -> Option<u32> {
        if self.page_size == 0 {
            return None;
        }
        Some(self.total_items.div_ceil(self.page_size))
    }

    /// Whether another page should be requested after this one.
    pub fn has_next(&self) -> bool {
        self.max_page()
            .is_some_and(|max_page| self.current_page < max_page)
    }
}
