//! Date parsing for registrar listings.
//!
//! `Expires` attributes come back as `MM/DD/YYYY`; ISO dates (and RFC 3339 timestamps)
//! are accepted too so cached or hand-written listings parse the same way.

use chrono::{DateTime, NaiveDate};

/// Parse an expiry date, `None` when blank or in an unknown format.
pub fn parse_expiry(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(text, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
