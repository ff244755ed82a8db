//! # namecheap-dns
//!
//! A typed, validated object model for host records managed by the Namecheap DNS
//! service, plus a rate-limited client for its XML API.
//!
//! ## Layers
//!
//! | Layer | Types |
//! |-------|-------|
//! | Records | [`Record`], [`RecordKind`], [`RecordStore`] |
//! | Views | [`SingleValueView`], [`MultiValueView`], [`RecordSet`], [`RecordDictionary`] |
//! | API | [`DnsApi`], [`DnsContext`], [`NullApi`], [`RegisteredDomain`] |
//! | Call budget | [`RateLimiter`] |
//!
//! Views are projections over a shared [`RecordStore`]: any number of views may point
//! at the same `(kind, name)` slot and all of them see every change immediately. The
//! store and its views are single-threaded (`Rc`-based); [`DnsContext`] is `Send + Sync`
//! and cheap to clone.
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: use the platform's native TLS implementation.
//! - **`rustls`**: use rustls. Recommended for cross-compilation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use namecheap_dns::{ContextConfig, DnsContext, RecordView};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Create a context (the client IP must be whitelisted on the account)
//!     let config = ContextConfig::sandbox("api-user", "api-key", "203.0.113.7");
//!     let context = DnsContext::new(config)?;
//!
//!     // 2. Find a domain and load its host records
//!     let Some(domain) = context.domain("example.com").await? else {
//!         return Ok(());
//!     };
//!     let hosts = domain.host_records().await?;
//!
//!     // 3. Edit through the views
//!     hosts.get("www").ipv4_addresses().set_value("192.0.2.1\n192.0.2.2");
//!     hosts.get("@").mail_servers().add("mail.example.com.");
//!
//!     // 4. Validate and upload
//!     if !domain.save().await? {
//!         for error in domain.save_errors() {
//!             eprintln!("{error}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Offline Use
//!
//! ```rust
//! use namecheap_dns::{RecordDictionary, RecordStore, RecordView};
//!
//! let store = RecordStore::new();
//! let hosts = RecordDictionary::new(&store);
//! hosts.get("www").canonical_name().set_value("example.com.");
//!
//! assert!(hosts.contains_key("WWW"));
//! assert!(hosts.validate().is_ok());
//! ```
//!
//! ## Error Handling
//!
//! Every API operation returns [`Result<T, NamecheapError>`](NamecheapError).
//! Validation never fails with an error: it produces message lists, and
//! [`RegisteredDomain::save`] reports service-side rejections through
//! [`RegisteredDomain::save_errors`]. Nothing is retried automatically.

mod config;
mod context;
mod domain;
mod error;
mod factory;
mod http_client;
mod protocol;
mod rate_limit;
mod records;
mod traits;
mod types;
mod utils;
mod validation;
mod views;
mod xml;

pub use config::{ContextConfig, PRODUCTION_HOST, SANDBOX_HOST};
pub use context::{DEFAULT_MAX_WAIT, DnsContext, DnsContextBuilder};
pub use domain::RegisteredDomain;
pub use error::{NamecheapError, Result};
pub use factory::{create_api, offline_api};
pub use protocol::{ApiCommand, FALLBACK_TLDS, split_domain_name};
pub use rate_limit::{Clock, RateLimiter, RateLimiterBuilder, RateLimits, SystemClock};
pub use records::{
    AliasRecord, CaaRecord, CaaTag, CnameRecord, DEFAULT_ALIAS_TTL, DEFAULT_MX_PREFERENCE,
    DEFAULT_TTL, HostRecord, Ipv4Record, Ipv6Record, MailEasyRecord, MailRecord,
    MaskedRedirectRecord, NameserverRecord, PermanentRedirectRecord, Record, RecordKind,
    RecordStore, TextRecord, UnmaskedRedirectRecord, names_match,
};
pub use traits::{DnsApi, NULL_API_TLDS, NullApi};
pub use types::{ApiErrorEntry, DomainInfo, Paging};
pub use validation::{FieldRule, FieldSpec, FieldValue, RecordField, ValidationResult};
pub use views::{
    MultiValueView, RecordDictionary, RecordSet, RecordSetField, RecordView, SingleValueView,
};
pub use xml::XmlElement;

// Re-export utils module
pub use utils::datetime;
