use std::cell::OnceCell;
use std::fmt;

use super::{MultiValueView, RecordView, SingleValueView};
use crate::records::{HostRecord, Record, RecordKind, RecordStore, names_match};
use crate::validation::ValidationResult;

/// Named views of a [`RecordSet`], one per record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordSetField {
    Ipv4Addresses,
    Ipv6Addresses,
    Aliases,
    CanonicalName,
    CertificateAuthorities,
    MailServers,
    MailAddress,
    Nameservers,
    TextValues,
    UnmaskedRedirect,
    MaskedRedirect,
    PermanentRedirect,
}

impl RecordSetField {
    /// Every field, in read-back order.
    pub const ALL: [Self; 12] = [
        Self::Ipv4Addresses,
        Self::Ipv6Addresses,
        Self::Aliases,
        Self::CanonicalName,
        Self::CertificateAuthorities,
        Self::MailServers,
        Self::MailAddress,
        Self::Nameservers,
        Self::TextValues,
        Self::UnmaskedRedirect,
        Self::MaskedRedirect,
        Self::PermanentRedirect,
    ];

    pub const fn kind(self) -> RecordKind {
        match self {
            Self::Ipv4Addresses => RecordKind::A,
            Self::Ipv6Addresses => RecordKind::Aaaa,
            Self::Aliases => RecordKind::Alias,
            Self::CanonicalName => RecordKind::Cname,
            Self::CertificateAuthorities => RecordKind::Caa,
            Self::MailServers => RecordKind::Mx,
            Self::MailAddress => RecordKind::Mxe,
            Self::Nameservers => RecordKind::Ns,
            Self::TextValues => RecordKind::Txt,
            Self::UnmaskedRedirect => RecordKind::Url,
            Self::MaskedRedirect => RecordKind::Frame,
            Self::PermanentRedirect => RecordKind::Url301,
        }
    }

    pub const fn for_kind(kind: RecordKind) -> Self {
        match kind {
            RecordKind::A => Self::Ipv4Addresses,
            RecordKind::Aaaa => Self::Ipv6Addresses,
            RecordKind::Alias => Self::Aliases,
            RecordKind::Cname => Self::CanonicalName,
            RecordKind::Caa => Self::CertificateAuthorities,
            RecordKind::Mx => Self::MailServers,
            RecordKind::Mxe => Self::MailAddress,
            RecordKind::Ns => Self::Nameservers,
            RecordKind::Txt => Self::TextValues,
            RecordKind::Url => Self::UnmaskedRedirect,
            RecordKind::Frame => Self::MaskedRedirect,
            RecordKind::Url301 => Self::PermanentRedirect,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ipv4Addresses => "IPv4Addresses",
            Self::Ipv6Addresses => "IPv6Addresses",
            Self::Aliases => "Aliases",
            Self::CanonicalName => "CanonicalName",
            Self::CertificateAuthorities => "CertificateAuthorities",
            Self::MailServers => "MailServers",
            Self::MailAddress => "MailAddress",
            Self::Nameservers => "Nameservers",
            Self::TextValues => "TextValues",
            Self::UnmaskedRedirect => "UnmaskedRedirect",
            Self::MaskedRedirect => "MaskedRedirect",
            Self::PermanentRedirect => "PermanentRedirect",
        }
    }
}

impl fmt::Display for RecordSetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every record of one host name, exposed through one view per kind.
///
/// Views are created on first access and kept for the life of the set.
pub struct RecordSet {
    store: RecordStore,
    name: String,
    ipv4_addresses: OnceCell<MultiValueView>,
    ipv6_addresses: OnceCell<MultiValueView>,
    aliases: OnceCell<MultiValueView>,
    canonical_name: OnceCell<SingleValueView>,
    certificate_authorities: OnceCell<MultiValueView>,
    mail_servers: OnceCell<MultiValueView>,
    mail_address: OnceCell<SingleValueView>,
    nameservers: OnceCell<MultiValueView>,
    text_values: OnceCell<MultiValueView>,
    unmasked_redirect: OnceCell<SingleValueView>,
    masked_redirect: OnceCell<SingleValueView>,
    permanent_redirect: OnceCell<SingleValueView>,
}

impl fmt::Debug for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSet")
            .field("name", &self.name)
            .field("records", &self.records())
            .finish_non_exhaustive()
    }
}

impl RecordSet {
    pub fn new(store: &RecordStore, name: impl Into<String>) -> Self {
        Self {
            store: store.clone(),
            name: name.into(),
            ipv4_addresses: OnceCell::new(),
            ipv6_addresses: OnceCell::new(),
            aliases: OnceCell::new(),
            canonical_name: OnceCell::new(),
            certificate_authorities: OnceCell::new(),
            mail_servers: OnceCell::new(),
            mail_address: OnceCell::new(),
            nameservers: OnceCell::new(),
            text_values: OnceCell::new(),
            unmasked_redirect: OnceCell::new(),
            masked_redirect: OnceCell::new(),
            permanent_redirect: OnceCell::new(),
        }
    }

    /// Set over its own private store.
    pub fn standalone(name: impl Into<String>) -> Self {
        Self::new(&RecordStore::new(), name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    fn multi<'a>(&'a self, cell: &'a OnceCell<MultiValueView>, kind: RecordKind) -> &'a MultiValueView {
        cell.get_or_init(|| MultiValueView::new(&self.store, kind, self.name.as_str()))
    }

    fn single<'a>(
        &'a self,
        cell: &'a OnceCell<SingleValueView>,
        kind: RecordKind,
    ) -> &'a SingleValueView {
        cell.get_or_init(|| SingleValueView::new(&self.store, kind, self.name.as_str()))
    }

    pub fn ipv4_addresses(&self) -> &MultiValueView {
        self.multi(&self.ipv4_addresses, RecordKind::A)
    }

    pub fn ipv6_addresses(&self) -> &MultiValueView {
        self.multi(&self.ipv6_addresses, RecordKind::Aaaa)
    }

    pub fn aliases(&self) -> &MultiValueView {
        self.multi(&self.aliases, RecordKind::Alias)
    }

    pub fn canonical_name(&self) -> &SingleValueView {
        self.single(&self.canonical_name, RecordKind::Cname)
    }

    pub fn certificate_authorities(&self) -> &MultiValueView {
        self.multi(&self.certificate_authorities, RecordKind::Caa)
    }

    pub fn mail_servers(&self) -> &MultiValueView {
        self.multi(&self.mail_servers, RecordKind::Mx)
    }

    pub fn mail_address(&self) -> &SingleValueView {
        self.single(&self.mail_address, RecordKind::Mxe)
    }

    pub fn nameservers(&self) -> &MultiValueView {
        self.multi(&self.nameservers, RecordKind::Ns)
    }

    pub fn text_values(&self) -> &MultiValueView {
        self.multi(&self.text_values, RecordKind::Txt)
    }

    pub fn unmasked_redirect(&self) -> &SingleValueView {
        self.single(&self.unmasked_redirect, RecordKind::Url)
    }

    pub fn masked_redirect(&self) -> &SingleValueView {
        self.single(&self.masked_redirect, RecordKind::Frame)
    }

    pub fn permanent_redirect(&self) -> &SingleValueView {
        self.single(&self.permanent_redirect, RecordKind::Url301)
    }

    /// The view backing `field`.
    pub fn view(&self, field: RecordSetField) -> &dyn RecordView {
        match field {
            RecordSetField::Ipv4Addresses => self.ipv4_addresses(),
            RecordSetField::Ipv6Addresses => self.ipv6_addresses(),
            RecordSetField::Aliases => self.aliases(),
            RecordSetField::CanonicalName => self.canonical_name(),
            RecordSetField::CertificateAuthorities => self.certificate_authorities(),
            RecordSetField::MailServers => self.mail_servers(),
            RecordSetField::MailAddress => self.mail_address(),
            RecordSetField::Nameservers => self.nameservers(),
            RecordSetField::TextValues => self.text_values(),
            RecordSetField::UnmaskedRedirect => self.unmasked_redirect(),
            RecordSetField::MaskedRedirect => self.masked_redirect(),
            RecordSetField::PermanentRedirect => self.permanent_redirect(),
        }
    }

    /// Records of every kind stored for this name, in store order.
    pub fn records(&self) -> Vec<Record> {
        self.store.for_name(&self.name)
    }

    pub fn is_empty(&self) -> bool {
        let name = self.name.as_str();
        !self.store.any(|record| names_match(record.name(), name))
    }

    /// Remove every record for this name.
    pub fn clear(&self) {
        let name = self.name.as_str();
        self.store
            .remove_where(|record| names_match(record.name(), name));
    }

    /// Replace this set's records with a per-view copy of `other`.
    ///
    /// No-op when both sets address the same name in the same store.
    pub fn copy_from(&self, other: &Self) {
        if self.store.same_store(&other.store) && names_match(&self.name, &other.name) {
            return;
        }

        self.clear();

        self.ipv4_addresses().copy_from(other.ipv4_addresses());
        self.ipv6_addresses().copy_from(other.ipv6_addresses());
        self.aliases().copy_from(other.aliases());
        self.canonical_name().copy_from(other.canonical_name());
        self.certificate_authorities()
            .copy_from(other.certificate_authorities());
        self.mail_servers().copy_from(other.mail_servers());
        self.mail_address().copy_from(other.mail_address());
        self.nameservers().copy_from(other.nameservers());
        self.text_values().copy_from(other.text_values());
        self.unmasked_redirect().copy_from(other.unmasked_redirect());
        self.masked_redirect().copy_from(other.masked_redirect());
        self.permanent_redirect().copy_from(other.permanent_redirect());
    }

    /// Records grouped by view, each view in its own read-back order.
    pub fn to_host_records(&self) -> Vec<Record> {
        RecordSetField::ALL
            .into_iter()
            .flat_map(|field| self.view(field).to_host_records())
            .collect()
    }

    /// Cross-kind conflicts between the records of this name.
    pub fn validate(&self) -> Vec<ValidationResult> {
        let records = self.records();
        let count = |kinds: &[RecordKind]| {
            records
                .iter()
                .filter(|record| kinds.contains(&record.kind()))
                .count()
        };

        let cname = count(&[RecordKind::Cname]);
        let addresses = count(&[RecordKind::A, RecordKind::Aaaa, RecordKind::Alias]);
        let mail_servers = count(&[RecordKind::Mx]);
        let mail_address = count(&[RecordKind::Mxe]);
        let unmasked = count(&[RecordKind::Url]);
        let masked = count(&[RecordKind::Frame]);
        let permanent = count(&[RecordKind::Url301]);

        let mut results = Vec::new();

        if cname > 0 && records.len() > cname {
            results.push(conflict(
                RecordSetField::CanonicalName,
                "cannot exist alongside other records".to_string(),
            ));
        }

        if mail_servers > 0 && mail_address > 0 {
            results.push(alongside(RecordSetField::MailServers, RecordSetField::MailAddress));
            results.push(alongside(RecordSetField::MailAddress, RecordSetField::MailServers));
        }

        let redirects = [
            (RecordSetField::UnmaskedRedirect, unmasked),
            (RecordSetField::MaskedRedirect, masked),
            (RecordSetField::PermanentRedirect, permanent),
        ];
        for (field, present) in redirects {
            if present == 0 {
                continue;
            }
            for (other, other_present) in redirects {
                if other != field && other_present > 0 {
                    results.push(alongside(field, other));
                }
            }
            if addresses > 0 {
                results.push(conflict(
                    field,
                    format!(
                        "cannot be set alongside {}, {}, or {}",
                        RecordSetField::Ipv4Addresses,
                        RecordSetField::Ipv6Addresses,
                        RecordSetField::Aliases
                    ),
                ));
            }
        }

        results
    }

    /// Formatted cross-kind conflict messages (empty when valid).
    pub fn errors(&self) -> Vec<String> {
        self.validate().iter().map(ToString::to_string).collect()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

fn conflict(field: RecordSetField, message: String) -> ValidationResult {
    ValidationResult::new(field.as_str(), message)
}

fn alongside(field: RecordSetField, other: RecordSetField) -> ValidationResult {
    conflict(field, format!("cannot be set alongside {other}"))
}
