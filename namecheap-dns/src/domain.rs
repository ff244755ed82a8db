//! A domain registered on the account and its host records.

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::protocol::{self, ApiCommand};
use crate::records::{Record, RecordStore};
use crate::traits::{DnsApi, NullApi};
use crate::types::DomainInfo;
use crate::views::RecordDictionary;

const SAVE_FAILED: &str = "API: The save operation failed.";
const NO_RESULT: &str = "API: No result was returned from the API.";

/// Host records of one domain, loaded from and saved to the API.
///
/// The domain either owns its record store (loaded on first access to
/// [`host_records`](Self::host_records)) or wraps a store supplied by the caller
/// (see [`offline`](Self::offline)), in which case [`reload`](Self::reload) never
/// touches it.
///
/// Like the store, a `RegisteredDomain` is single-threaded.
pub struct RegisteredDomain {
    api: Arc<dyn DnsApi>,
    info: DomainInfo,
    store: RecordStore,
    owns_store: bool,
    dictionary: OnceCell<RecordDictionary>,
    dns_servers: OnceCell<Vec<String>>,
    save_errors: RefCell<Vec<String>>,
}

impl fmt::Debug for RegisteredDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredDomain")
            .field("info", &self.info)
            .field("records", &self.store.len())
            .field("owns_store", &self.owns_store)
            .finish_non_exhaustive()
    }
}

impl RegisteredDomain {
    /// Domain backed by `api`, with a private store filled on first access.
    pub fn new(api: Arc<dyn DnsApi>, info: DomainInfo) -> Self {
        Self {
            api,
            info,
            store: RecordStore::new(),
            owns_store: true,
            dictionary: OnceCell::new(),
            dns_servers: OnceCell::new(),
            save_errors: RefCell::new(Vec::new()),
        }
    }

    /// Domain over an existing store, with no live API behind it.
    pub fn offline(store: &RecordStore, name: impl Into<String>) -> Self {
        Self {
            api: Arc::new(NullApi),
            info: DomainInfo::named(name),
            store: store.clone(),
            owns_store: false,
            dictionary: OnceCell::new(),
            dns_servers: OnceCell::new(),
            save_errors: RefCell::new(Vec::new()),
        }
    }

    pub fn info(&self) -> &DomainInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn owns_store(&self) -> bool {
        self.owns_store
    }

    /// Replace the store contents with the records held by the API.
    ///
    /// On error the store is left untouched. No-op for domains that do not own their store.
    pub async fn reload(&self) -> Result<()> {
        if !self.owns_store {
            return Ok(());
        }

        let (sld, tld) = self.api.split_domain_name(&self.info.name).await;
        let response = self
            .api
            .execute(ApiCommand::GetDnsHosts, &protocol::domain_params(&sld, &tld))
            .await?;
        let records = protocol::parse_hosts(&response)?;
        log::debug!(
            "[namecheap] Loaded {} host records for {}",
            records.len(),
            self.info.name
        );

        // a failed fetch leaves the current records in place
        self.store.clear();
        if let Some(dictionary) = self.dictionary.get() {
            dictionary.clear();
        }
        self.store.extend_records(records);
        Ok(())
    }

    /// Dictionary over this domain's records; the first call loads them.
    pub async fn host_records(&self) -> Result<&RecordDictionary> {
        if let Some(dictionary) = self.dictionary.get() {
            return Ok(dictionary);
        }
        self.reload().await?;
        Ok(self
            .dictionary
            .get_or_init(|| RecordDictionary::new(&self.store)))
    }

    /// Name servers the domain delegates to; fetched once.
    pub async fn dns_servers(&self) -> Result<&[String]> {
        if let Some(servers) = self.dns_servers.get() {
            return Ok(servers);
        }

        let (sld, tld) = self.api.split_domain_name(&self.info.name).await;
        let response = self
            .api
            .execute(ApiCommand::GetDnsServers, &protocol::domain_params(&sld, &tld))
            .await?;
        let servers = protocol::parse_nameservers(&response);
        Ok(self.dns_servers.get_or_init(|| servers))
    }

    /// Validate and upload every host record.
    ///
    /// Returns `Ok(false)` with [`save_errors`](Self::save_errors) filled when
    /// validation fails (nothing is sent) or the API rejects the update. Transport,
    /// parse and call-slot errors are returned as `Err`.
    pub async fn save(&self) -> Result<bool> {
        let dictionary = self.host_records().await?;
        if let Err(errors) = dictionary.validate() {
            log::warn!(
                "[namecheap] Not saving {}: {} validation errors",
                self.info.name,
                errors.len()
            );
            self.save_errors.replace(errors);
            return Ok(false);
        }

        let (sld, tld) = self.api.split_domain_name(&self.info.name).await;
        let params = protocol::set_hosts_params(&sld, &tld, &self.to_host_records());

        let (success, errors) = match self.api.execute(ApiCommand::SetDnsHosts, &params).await {
            Ok(response) => match protocol::parse_set_hosts_result(&response) {
                Some(true) => (true, Vec::new()),
                Some(false) => (false, vec![SAVE_FAILED.to_string()]),
                None => (false, vec![NO_RESULT.to_string()]),
            },
            Err(e) if e.is_api_level() => (false, vec![format!("API: {e}")]),
            Err(e) => return Err(e),
        };

        if success {
            log::info!("[namecheap] Saved {} host records for {}", self.store.len(), self.info.name);
        } else {
            log::warn!("[namecheap] Save failed for {}: {}", self.info.name, errors.join("; "));
        }
        self.save_errors.replace(errors);
        Ok(success)
    }

    /// Messages from the last [`save`](Self::save); empty after a successful one.
    pub fn save_errors(&self) -> Vec<String> {
        self.save_errors.borrow().clone()
    }

    /// Every record, ordered by name, kind, preference and value.
    pub fn to_host_records(&self) -> Vec<Record> {
        match self.dictionary.get() {
            Some(dictionary) => dictionary.to_host_records(),
            None => RecordDictionary::new(&self.store).to_host_records(),
        }
    }
}
