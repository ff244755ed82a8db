use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{HostRecord, Record, RecordKind};

/// `flag tag "authority"`, quotes optional.
static CAA_VALUE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"^(?P<flag>\d+)\s+(?P<tag>\w+)\s+"?(?P<ca>[^"]+)"?$"#).ok()
});

/// Property tag of a CAA record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaaTag {
    /// Authority allowed to issue certificates for the host.
    #[default]
    Issue,
    /// Authority allowed to issue wildcard certificates for the host.
    IssueWild,
    /// Where authorities report policy violations (RFC 5070 address or URL).
    Iodef,
}

impl CaaTag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::IssueWild => "issuewild",
            Self::Iodef => "iodef",
        }
    }

    /// Case-insensitive parse; `None` for unknown tags.
    pub fn parse(s: &str) -> Option<Self> {
        [Self::Issue, Self::IssueWild, Self::Iodef]
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for CaaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Certification authority authorization record.
///
/// The wire value is composed from the structured fields as `{flag} {tag} "{authority}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaaRecord {
    name: String,
    flag: u8,
    tag: CaaTag,
    certificate_authority: String,
    ttl: u32,
}

impl CaaRecord {
    pub fn new(
        name: impl Into<String>,
        flag: u8,
        tag: CaaTag,
        certificate_authority: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            name: name.into(),
            flag,
            tag,
            certificate_authority: certificate_authority.into(),
            ttl,
        }
    }

    /// Parse the composed text form.
    ///
    /// Unparsable input falls back to flag `0`, tag `issue` and an empty authority.
    pub fn parse(name: impl Into<String>, value: &str, ttl: u32) -> Self {
        let captures = CAA_VALUE
            .as_ref()
            .and_then(|pattern| pattern.captures(value.trim()));

        let Some(captures) = captures else {
            return Self::new(name, 0, CaaTag::Issue, "", ttl);
        };

        let flag = captures["flag"].parse::<u8>().unwrap_or(0);
        let tag = CaaTag::parse(&captures["tag"]).unwrap_or_default();
        Self::new(name, flag, tag, &captures["ca"], ttl)
    }

    pub fn flag(&self) -> u8 {
        self.flag
    }

    pub fn tag(&self) -> CaaTag {
        self.tag
    }

    pub fn certificate_authority(&self) -> &str {
        &self.certificate_authority
    }
}

impl Default for CaaRecord {
    fn default() -> Self {
        Self::new("", 0, CaaTag::Issue, "", RecordKind::Caa.default_ttl())
    }
}

impl HostRecord for CaaRecord {
    fn kind(&self) -> RecordKind {
        RecordKind::Caa
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Cow<'_, str> {
        Cow::Owned(format!(
            "{} {} \"{}\"",
            self.flag, self.tag, self.certificate_authority
        ))
    }

    fn ttl(&self) -> u32 {
        self.ttl
    }

    fn preference(&self) -> u32 {
        0
    }

    fn create(&self, name: &str, value: &str, ttl: u32, _preference: u32) -> Record {
        Record::Caa(Self::parse(name, value, ttl))
    }
}
