//! Projections over a [`RecordStore`](crate::RecordStore).
//!
//! A view is identified by `(kind, name, store)` and never caches records: every read
//! recomputes membership from the store, so two views over the same slot always agree.
//! Views only remember TTL/preference hints used when new records are materialized.

mod dictionary;
mod multi;
mod set;
mod single;

pub use dictionary::RecordDictionary;
pub use multi::MultiValueView;
pub use set::{RecordSet, RecordSetField};
pub use single::SingleValueView;

use crate::records::{Record, RecordKind};

/// Behaviour shared by single- and multi-value views.
pub trait RecordView {
    fn kind(&self) -> RecordKind;

    fn name(&self) -> &str;

    /// Current value; multi-value views join their values with `\n`.
    fn value(&self) -> String;

    /// TTL hint applied to records this view creates.
    fn ttl(&self) -> u32;

    fn set_value(&self, value: &str);

    fn clear_value(&self);

    fn change_ttl(&self, ttl: u32);

    /// Copy of the records currently in this view's slot, in read-back order.
    fn to_host_records(&self) -> Vec<Record>;
}

/// Split multi-line text into trimmed, non-empty values.
pub(crate) fn split_values(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(str::trim).filter(|line| !line.is_empty())
}
