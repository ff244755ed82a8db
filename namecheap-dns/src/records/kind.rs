use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NamecheapError;

/// Default TTL (seconds) applied to records created without an explicit one.
pub const DEFAULT_TTL: u32 = 1799;

/// Default TTL for `ALIAS` records.
pub const DEFAULT_ALIAS_TTL: u32 = 300;

/// Default preference step for `MX` records.
pub const DEFAULT_MX_PREFERENCE: u32 = 5;

/// DNS record types supported by the Namecheap host-record API.
///
/// The declaration order is the order used when sorting records by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordKind {
    /// IPv4 address.
    A,
    /// IPv6 address.
    Aaaa,
    /// Registrar-specific virtual address that follows another host.
    Alias,
    /// Certification authority authorization.
    Caa,
    Cname,
    Mx,
    /// Registrar-specific mail forwarding to an IPv4 address.
    Mxe,
    Ns,
    Txt,
    /// Unmasked URL redirect.
    Url,
    /// Permanent (301) URL redirect.
    Url301,
    /// Masked URL redirect.
    Frame,
}

impl RecordKind {
    /// Every supported kind, in sort order.
    pub const ALL: [Self; 12] = [
        Self::A,
        Self::Aaaa,
        Self::Alias,
        Self::Caa,
        Self::Cname,
        Self::Mx,
        Self::Mxe,
        Self::Ns,
        Self::Txt,
        Self::Url,
        Self::Url301,
        Self::Frame,
    ];

    /// Wire name of the kind (`"A"`, `"URL301"`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Alias => "ALIAS",
            Self::Caa => "CAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Mxe => "MXE",
            Self::Ns => "NS",
            Self::Txt => "TXT",
            Self::Url => "URL",
            Self::Url301 => "URL301",
            Self::Frame => "FRAME",
        }
    }

    /// Only `MX` records carry a meaningful preference.
    pub const fn uses_preference(self) -> bool {
        matches!(self, Self::Mx)
    }

    /// TTL given to records of this kind when none is specified.
    pub const fn default_ttl(self) -> u32 {
        match self {
            Self::Alias => DEFAULT_ALIAS_TTL,
            _ => DEFAULT_TTL,
        }
    }

    /// Preference given to records of this kind when none is specified.
    pub const fn default_preference(self) -> u32 {
        if self.uses_preference() {
            DEFAULT_MX_PREFERENCE
        } else {
            0
        }
    }

    /// Kinds that hold at most one value per host name.
    pub const fn is_single_valued(self) -> bool {
        matches!(
            self,
            Self::Cname | Self::Mxe | Self::Url | Self::Url301 | Self::Frame
        )
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = NamecheapError;

    /// Case-insensitive match on the wire name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| NamecheapError::UnsupportedRecordType {
                record_type: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_names_case_insensitively() {
        assert!(matches!("a".parse::<RecordKind>(), Ok(RecordKind::A)));
        assert!(matches!("Url301".parse::<RecordKind>(), Ok(RecordKind::Url301)));
        assert!(matches!(" mx ".parse::<RecordKind>(), Ok(RecordKind::Mx)));
    }

    #[test]
    fn rejects_unknown_types() {
        let result = "SRV".parse::<RecordKind>();
        assert!(
            matches!(&result, Err(NamecheapError::UnsupportedRecordType { record_type }) if record_type == "SRV"),
            "unexpected result: {result:?}"
        );
    }

    #[test]
    fn display_round_trips_every_kind() {
        for kind in RecordKind::ALL {
            assert!(matches!(kind.to_string().parse::<RecordKind>(), Ok(k) if k == kind));
        }
    }

    #[test]
    fn only_mx_uses_preference() {
        let users: Vec<_> = RecordKind::ALL
            .into_iter()
            .filter(|kind| kind.uses_preference())
            .collect();
        assert_eq!(users, vec![RecordKind::Mx]);
        assert_eq!(RecordKind::Mx.default_preference(), 5);
        assert_eq!(RecordKind::Cname.default_preference(), 0);
    }

    #[test]
    fn alias_has_short_default_ttl() {
        assert_eq!(RecordKind::Alias.default_ttl(), 300);
        assert_eq!(RecordKind::Txt.default_ttl(), 1799);
    }

    #[test]
    fn serializes_as_wire_name() {
        let json = serde_json::to_string(&RecordKind::Url301);
        assert!(matches!(json.as_deref(), Ok("\"URL301\"")));
    }
}
