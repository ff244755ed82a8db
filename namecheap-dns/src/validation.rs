//! Field-level rules and cross-field validation results.
//!
//! Field rules are small predicates attached per record kind and field. They never
//! fail with an error; every violation becomes a message in the returned list.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::records::{HostRecord, Record, RecordKind};

static CANONICAL_NAME: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9]([a-z0-9_-]*[a-z0-9])?(?:\.[a-z0-9]([a-z0-9_-]*[a-z0-9])?)*\.?$").ok()
});

/// Value handed to a [`FieldRule`].
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(i64),
}

/// A single predicate on one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Non-empty and not only whitespace.
    Required,
    /// At most this many characters.
    MaxLength(usize),
    /// Inclusive numeric range.
    Range(i64, i64),
    /// Host name made of dot-separated labels, optional trailing dot.
    CanonicalName,
    Ipv4Address,
    Ipv6Address,
    /// Absolute `http` or `https` URL.
    WebAddress,
}

impl FieldRule {
    /// Check `value`, returning the violation message for `field` when it fails.
    ///
    /// Rules ignore values of the wrong shape (a length rule on a number passes).
    pub fn check(&self, field: &str, value: FieldValue<'_>) -> Option<String> {
        let valid = match (*self, value) {
            (Self::Required, FieldValue::Text(text)) => !text.trim().is_empty(),
            (Self::MaxLength(max), FieldValue::Text(text)) => text.chars().count() <= max,
            (Self::Range(min, max), FieldValue::Number(n)) => (min..=max).contains(&n),
            (Self::CanonicalName, FieldValue::Text(text)) => is_canonical_name(text),
            (Self::Ipv4Address, FieldValue::Text(text)) => text.parse::<Ipv4Addr>().is_ok(),
            (Self::Ipv6Address, FieldValue::Text(text)) => text.parse::<Ipv6Addr>().is_ok(),
            (Self::WebAddress, FieldValue::Text(text)) => is_web_address(text),
            _ => true,
        };

        if valid {
            None
        } else {
            Some(self.message(field))
        }
    }

    fn message(&self, field: &str) -> String {
        match self {
            Self::Required => format!("The {field} field is required."),
            Self::MaxLength(max) => {
                format!("The field {field} must be a string with a maximum length of {max}.")
            }
            Self::Range(min, max) => format!("The field {field} must be between {min} and {max}."),
            Self::CanonicalName => format!("The {field} field must be a valid canonical name."),
            Self::Ipv4Address => format!("The {field} field must be a valid IPv4 address."),
            Self::Ipv6Address => format!("The {field} field must be a valid IPv6 address."),
            Self::WebAddress => format!("The {field} field must be an HTTP web address."),
        }
    }
}

pub fn is_canonical_name(text: &str) -> bool {
    CANONICAL_NAME
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(text))
}

pub fn is_web_address(text: &str) -> bool {
    Url::parse(text).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Run every rule against one field, collecting the messages.
pub fn check_field(field: &str, value: FieldValue<'_>, rules: &[FieldRule]) -> Vec<String> {
    rules
        .iter()
        .filter_map(|rule| rule.check(field, value))
        .collect()
}

/// Record fields that carry rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Name,
    Value,
    CertificateAuthority,
    TimeToLive,
}

impl RecordField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Value => "Value",
            Self::CertificateAuthority => "CertificateAuthority",
            Self::TimeToLive => "TimeToLive",
        }
    }
}

/// Rules for one field of one kind.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: RecordField,
    pub rules: &'static [FieldRule],
}

const NAME_RULES: &[FieldRule] = &[FieldRule::Required, FieldRule::MaxLength(63)];
const TTL_RULES: &[FieldRule] = &[FieldRule::Range(60, 7200)];
const TEXT_VALUE_RULES: &[FieldRule] = &[FieldRule::Required, FieldRule::MaxLength(255)];
const IPV4_VALUE_RULES: &[FieldRule] = &[
    FieldRule::Required,
    FieldRule::MaxLength(255),
    FieldRule::Ipv4Address,
];
const IPV6_VALUE_RULES: &[FieldRule] = &[
    FieldRule::Required,
    FieldRule::MaxLength(255),
    FieldRule::Ipv6Address,
];
const CANONICAL_VALUE_RULES: &[FieldRule] = &[
    FieldRule::Required,
    FieldRule::MaxLength(255),
    FieldRule::CanonicalName,
];
const WEB_VALUE_RULES: &[FieldRule] = &[
    FieldRule::Required,
    FieldRule::MaxLength(255),
    FieldRule::WebAddress,
];

macro_rules! specs {
    ($value_field:ident => $value_rules:expr) => {
        &[
            FieldSpec {
                field: RecordField::Name,
                rules: NAME_RULES,
            },
            FieldSpec {
                field: RecordField::$value_field,
                rules: $value_rules,
            },
            FieldSpec {
                field: RecordField::TimeToLive,
                rules: TTL_RULES,
            },
        ]
    };
}

const IPV4_SPECS: &[FieldSpec] = specs!(Value => IPV4_VALUE_RULES);
const IPV6_SPECS: &[FieldSpec] = specs!(Value => IPV6_VALUE_RULES);
const CANONICAL_SPECS: &[FieldSpec] = specs!(Value => CANONICAL_VALUE_RULES);
const WEB_SPECS: &[FieldSpec] = specs!(Value => WEB_VALUE_RULES);
const TEXT_SPECS: &[FieldSpec] = specs!(Value => TEXT_VALUE_RULES);
const CAA_SPECS: &[FieldSpec] = specs!(CertificateAuthority => TEXT_VALUE_RULES);

impl RecordKind {
    /// Field rules attached to records of this kind.
    pub const fn field_specs(self) -> &'static [FieldSpec] {
        match self {
            Self::A | Self::Mxe => IPV4_SPECS,
            Self::Aaaa => IPV6_SPECS,
            Self::Alias | Self::Cname | Self::Mx | Self::Ns => CANONICAL_SPECS,
            Self::Url | Self::Url301 | Self::Frame => WEB_SPECS,
            Self::Txt => TEXT_SPECS,
            Self::Caa => CAA_SPECS,
        }
    }
}

impl Record {
    /// Field-level validation messages for this record (empty when valid).
    pub fn validate(&self) -> Vec<String> {
        let value = self.value();
        let mut errors = Vec::new();
        for spec in self.kind().field_specs() {
            let field_value = match spec.field {
                RecordField::Name => FieldValue::Text(self.name()),
                RecordField::Value => FieldValue::Text(&value),
                RecordField::CertificateAuthority => match self {
                    Self::Caa(caa) => FieldValue::Text(caa.certificate_authority()),
                    _ => FieldValue::Text(&value),
                },
                RecordField::TimeToLive => FieldValue::Number(i64::from(self.ttl())),
            };
            errors.extend(check_field(spec.field.as_str(), field_value, spec.rules));
        }
        errors
    }
}

/// A cross-field violation, naming the offending fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub members: Vec<&'static str>,
    pub message: String,
}

impl ValidationResult {
    pub fn new(member: &'static str, message: impl Into<String>) -> Self {
        Self {
            members: vec![member],
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = if self.message.trim().is_empty() {
            "appears to be invalid"
        } else {
            self.message.as_str()
        };
        match self.members.as_slice() {
            [] => write!(f, "The object {message}"),
            [only] => write!(f, "The {only} field {message}"),
            [first, second] => write!(f, "The {first} and {second} fields {message}."),
            [init @ .., last] => {
                write!(f, "The {}, and {last} fields {message}.", init.join(", "))
            }
        }
    }
}
