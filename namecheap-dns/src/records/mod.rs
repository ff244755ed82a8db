//! Typed host records.
//!
//! Every supported [`RecordKind`] has one concrete struct implementing [`HostRecord`],
//! and [`Record`] is the closed union of them all. Records are immutable: changing a
//! field means building a new record with [`HostRecord::create`] and swapping it into
//! the [`RecordStore`].

mod caa;
mod kind;
mod store;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

pub use caa::{CaaRecord, CaaTag};
pub use kind::{DEFAULT_ALIAS_TTL, DEFAULT_MX_PREFERENCE, DEFAULT_TTL, RecordKind};
pub use store::RecordStore;

/// Common capability of every host record.
pub trait HostRecord {
    fn kind(&self) -> RecordKind;

    /// Host name relative to the domain (`@` for the apex, `*` for the wildcard).
    fn name(&self) -> &str;

    /// Full value as sent to and received from the API.
    fn value(&self) -> Cow<'_, str>;

    /// Seconds clients may cache the record.
    fn ttl(&self) -> u32;

    /// Lower values take precedence. Always `0` for kinds that do not use it.
    fn preference(&self) -> u32;

    /// New record of the same kind carrying the given fields.
    ///
    /// `preference` is ignored unless the kind uses it.
    fn create(&self, name: &str, value: &str, ttl: u32, preference: u32) -> Record;
}

/// Compare host names the way the API does (case-insensitive).
pub fn names_match(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

macro_rules! plain_record {
    ($(#[$meta:meta])* $ty:ident => $variant:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $ty {
            name: String,
            value: String,
            ttl: u32,
        }

        impl $ty {
            pub fn new(name: impl Into<String>, value: impl Into<String>, ttl: u32) -> Self {
                Self {
                    name: name.into(),
                    value: value.into(),
                    ttl,
                }
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new("", "", RecordKind::$variant.default_ttl())
            }
        }

        impl HostRecord for $ty {
            fn kind(&self) -> RecordKind {
                RecordKind::$variant
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn value(&self) -> Cow<'_, str> {
                Cow::Borrowed(&self.value)
            }

            fn ttl(&self) -> u32 {
                self.ttl
            }

            fn preference(&self) -> u32 {
                0
            }

            fn create(&self, name: &str, value: &str, ttl: u32, _preference: u32) -> Record {
                Record::$variant(Self::new(name, value, ttl))
            }
        }

        impl From<$ty> for Record {
            fn from(record: $ty) -> Self {
                Self::$variant(record)
            }
        }
    };
}

plain_record!(
    /// `A`: IPv4 address.
    Ipv4Record => A
);
plain_record!(
    /// `AAAA`: IPv6 address.
    Ipv6Record => Aaaa
);
plain_record!(
    /// `ALIAS`: virtual address following another host name.
    AliasRecord => Alias
);
plain_record!(
    /// `CNAME`: canonical name.
    CnameRecord => Cname
);
plain_record!(
    /// `MXE`: mail forwarded to an IPv4 address.
    MailEasyRecord => Mxe
);
plain_record!(
    /// `NS`: delegated name server.
    NameserverRecord => Ns
);
plain_record!(
    /// `TXT`: free text.
    TextRecord => Txt
);
plain_record!(
    /// `URL`: unmasked redirect.
    UnmaskedRedirectRecord => Url
);
plain_record!(
    /// `URL301`: permanent redirect.
    PermanentRedirectRecord => Url301
);
plain_record!(
    /// `FRAME`: masked redirect.
    MaskedRedirectRecord => Frame
);

/// `MX`: mail exchanger, the only kind that carries a preference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MailRecord {
    name: String,
    value: String,
    ttl: u32,
    preference: u32,
}

impl MailRecord {
    pub fn new(name: impl Into<String>, value: impl Into<String>, ttl: u32, preference: u32) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ttl,
            preference,
        }
    }
}

impl Default for MailRecord {
    fn default() -> Self {
        Self::new(
            "",
            "",
            RecordKind::Mx.default_ttl(),
            RecordKind::Mx.default_preference(),
        )
    }
}

impl HostRecord for MailRecord {
    fn kind(&self) -> RecordKind {
        RecordKind::Mx
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.value)
    }

    fn ttl(&self) -> u32 {
        self.ttl
    }

    fn preference(&self) -> u32 {
        self.preference
    }

    fn create(&self, name: &str, value: &str, ttl: u32, preference: u32) -> Record {
        Record::Mx(Self::new(name, value, ttl, preference))
    }
}

impl From<MailRecord> for Record {
    fn from(record: MailRecord) -> Self {
        Self::Mx(record)
    }
}

impl From<CaaRecord> for Record {
    fn from(record: CaaRecord) -> Self {
        Self::Caa(record)
    }
}

/// Any host record, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Record {
    A(Ipv4Record),
    Aaaa(Ipv6Record),
    Alias(AliasRecord),
    Caa(CaaRecord),
    Cname(CnameRecord),
    Mx(MailRecord),
    Mxe(MailEasyRecord),
    Ns(NameserverRecord),
    Txt(TextRecord),
    Url(UnmaskedRedirectRecord),
    Url301(PermanentRedirectRecord),
    Frame(MaskedRedirectRecord),
}

macro_rules! each_variant {
    ($record:expr, $inner:ident => $body:expr) => {
        match $record {
            Record::A($inner) => $body,
            Record::Aaaa($inner) => $body,
            Record::Alias($inner) => $body,
            Record::Caa($inner) => $body,
            Record::Cname($inner) => $body,
            Record::Mx($inner) => $body,
            Record::Mxe($inner) => $body,
            Record::Ns($inner) => $body,
            Record::Txt($inner) => $body,
            Record::Url($inner) => $body,
            Record::Url301($inner) => $body,
            Record::Frame($inner) => $body,
        }
    };
}

impl HostRecord for Record {
    fn kind(&self) -> RecordKind {
        each_variant!(self, r => r.kind())
    }

    fn name(&self) -> &str {
        each_variant!(self, r => r.name())
    }

    fn value(&self) -> Cow<'_, str> {
        each_variant!(self, r => r.value())
    }

    fn ttl(&self) -> u32 {
        each_variant!(self, r => r.ttl())
    }

    fn preference(&self) -> u32 {
        each_variant!(self, r => r.preference())
    }

    fn create(&self, name: &str, value: &str, ttl: u32, preference: u32) -> Record {
        each_variant!(self, r => r.create(name, value, ttl, preference))
    }
}

impl Record {
    /// Build a record of `kind` from its wire fields.
    pub fn new(kind: RecordKind, name: &str, value: &str, ttl: u32, preference: u32) -> Self {
        kind.prototype().create(name, value, ttl, preference)
    }

    /// Whether this record belongs to the `(kind, name)` slot.
    pub fn is(&self, kind: RecordKind, name: &str) -> bool {
        self.kind() == kind && names_match(self.name(), name)
    }

    /// Same record with a different TTL.
    #[must_use]
    pub fn with_ttl(&self, ttl: u32) -> Self {
        self.create(self.name(), &self.value(), ttl, self.preference())
    }

    /// Same record with a different preference.
    #[must_use]
    pub fn with_preference(&self, preference: u32) -> Self {
        self.create(self.name(), &self.value(), self.ttl(), preference)
    }

    /// Ordering key used for read-back and serialization within one host name.
    pub fn sort_key(&self) -> (RecordKind, u32, Cow<'_, str>) {
        (self.kind(), self.preference(), self.value())
    }
}

impl RecordKind {
    /// Default-valued record of this kind, used as the factory for new records.
    pub fn prototype(self) -> Record {
        match self {
            Self::A => Record::A(Ipv4Record::default()),
            Self::Aaaa => Record::Aaaa(Ipv6Record::default()),
            Self::Alias => Record::Alias(AliasRecord::default()),
            Self::Caa => Record::Caa(CaaRecord::default()),
            Self::Cname => Record::Cname(CnameRecord::default()),
            Self::Mx => Record::Mx(MailRecord::default()),
            Self::Mxe => Record::Mxe(MailEasyRecord::default()),
            Self::Ns => Record::Ns(NameserverRecord::default()),
            Self::Txt => Record::Txt(TextRecord::default()),
            Self::Url => Record::Url(UnmaskedRedirectRecord::default()),
            Self::Url301 => Record::Url301(PermanentRedirectRecord::default()),
            Self::Frame => Record::Frame(MaskedRedirectRecord::default()),
        }
    }
}
