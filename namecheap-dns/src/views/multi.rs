use std::cell::Cell;

use super::{RecordView, split_values};
use crate::records::{HostRecord, Record, RecordKind, RecordStore, names_match};

/// Ordered collection for kinds with any number of records per host name.
///
/// Values are kept distinct and read back ordered by `(preference, value)`. For `MX`
/// every new value is appended one preference step after the current maximum, and
/// removing a value renumbers the rest as `step, 2·step, ...`.
#[derive(Debug)]
pub struct MultiValueView {
    store: RecordStore,
    kind: RecordKind,
    name: String,
    owns_store: bool,
    ttl: Cell<u32>,
    step: Cell<u32>,
}

impl MultiValueView {
    /// View over a shared store; the TTL hint is the largest TTL already present.
    pub fn new(store: &RecordStore, kind: RecordKind, name: impl Into<String>) -> Self {
        Self::with_hints(store, kind, name, None, None)
    }

    pub fn with_hints(
        store: &RecordStore,
        kind: RecordKind,
        name: impl Into<String>,
        ttl: Option<u32>,
        step: Option<u32>,
    ) -> Self {
        Self::build(store.clone(), false, kind, name.into(), ttl, step)
    }

    /// Empty collection over its own private store.
    pub fn standalone(kind: RecordKind, name: impl Into<String>) -> Self {
        Self::build(RecordStore::new(), true, kind, name.into(), None, None)
    }

    /// Private collection seeded with `values`.
    pub fn from_values<I, S>(
        kind: RecordKind,
        name: impl Into<String>,
        values: I,
        ttl: Option<u32>,
        step: Option<u32>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let view = Self::build(RecordStore::new(), true, kind, name.into(), ttl, step);
        for value in values {
            view.add(value.as_ref());
        }
        view
    }

    fn build(
        store: RecordStore,
        owns_store: bool,
        kind: RecordKind,
        name: String,
        ttl: Option<u32>,
        step: Option<u32>,
    ) -> Self {
        let step = if kind.uses_preference() {
            step.unwrap_or_else(|| kind.default_preference())
        } else {
            0
        };
        let ttl = ttl.unwrap_or_else(|| {
            store
                .matching(kind, &name)
                .iter()
                .map(HostRecord::ttl)
                .max()
                .unwrap_or_else(|| kind.default_ttl())
        });

        Self {
            store,
            kind,
            name,
            owns_store,
            ttl: Cell::new(ttl),
            step: Cell::new(step),
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn owns_store(&self) -> bool {
        self.owns_store
    }

    /// Preference increment (always `0` for kinds without preference).
    pub fn preference_step(&self) -> u32 {
        self.step.get()
    }

    fn sorted_records(&self) -> Vec<Record> {
        let mut records = self.store.matching(self.kind, &self.name);
        records.sort_by(|a, b| {
            a.preference()
                .cmp(&b.preference())
                .then_with(|| a.value().cmp(&b.value()))
        });
        records
    }

    /// Values in `(preference, value)` order.
    pub fn values(&self) -> Vec<String> {
        self.sorted_records()
            .iter()
            .map(|record| record.value().into_owned())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = String> + use<> {
        self.values().into_iter()
    }

    pub fn len(&self) -> usize {
        let (kind, name) = (self.kind, self.name.as_str());
        self.store.filtered(|record| record.is(kind, name)).len()
    }

    pub fn is_empty(&self) -> bool {
        let (kind, name) = (self.kind, self.name.as_str());
        !self.store.any(|record| record.is(kind, name))
    }

    /// Exact (case-sensitive) value match.
    pub fn contains(&self, value: &str) -> bool {
        let (kind, name) = (self.kind, self.name.as_str());
        self.store
            .any(|record| record.is(kind, name) && record.value() == value)
    }

    /// Add `value` unless already present. Returns whether a record was added.
    pub fn add(&self, value: &str) -> bool {
        if self.contains(value) {
            return false;
        }

        let step = self.step.get();
        let preference = if step == 0 {
            0
        } else {
            let highest = self
                .store
                .matching(self.kind, &self.name)
                .iter()
                .map(HostRecord::preference)
                .max()
                .unwrap_or(0);
            highest.saturating_add(step)
        };

        self.store.push(Record::new(
            self.kind,
            &self.name,
            value,
            self.ttl.get(),
            preference,
        ));
        true
    }

    /// Remove `value`, renumbering the remaining preferences. Returns whether anything was removed.
    pub fn remove(&self, value: &str) -> bool {
        let (kind, name) = (self.kind, self.name.as_str());
        let removed = self
            .store
            .remove_where(|record| record.is(kind, name) && record.value() == value);
        if removed > 0 {
            self.renumber();
        }
        removed > 0
    }

    pub fn clear(&self) {
        let (kind, name) = (self.kind, self.name.as_str());
        self.store.remove_where(|record| record.is(kind, name));
    }

    /// Change the preference step and renumber. Kinds without preference keep a zero step.
    pub fn change_preference(&self, step: u32) {
        if !self.kind.uses_preference() {
            self.step.set(0);
            return;
        }
        self.step.set(step);
        self.assign_preferences(step);
    }

    fn renumber(&self) {
        let step = self.step.get();
        if step > 0 {
            self.assign_preferences(step);
        }
    }

    fn assign_preferences(&self, step: u32) {
        let sorted = self.sorted_records();
        self.clear();
        let mut preference: u32 = 0;
        for record in sorted {
            preference = preference.saturating_add(step);
            self.store.push(record.with_preference(preference));
        }
    }

    /// Collection for `name` holding the newline-separated `value`.
    ///
    /// A private collection yields a new independent collection. A collection over a
    /// shared store yields one over the same store, replacing whatever `name` held.
    pub fn create(&self, name: &str, value: &str, ttl: u32, preference: u32) -> Self {
        let step = (preference > 0).then_some(preference);

        if self.owns_store {
            return Self::from_values(self.kind, name, split_values(value), Some(ttl), step);
        }

        let view = Self::with_hints(&self.store, self.kind, name, Some(ttl), step);
        view.clear();
        for line in split_values(value) {
            view.add(line);
        }
        view
    }

    /// Make this collection mirror `other` (TTL and values). No-op for the same slot.
    pub fn copy_from(&self, other: &Self) {
        if self.store.same_store(&other.store) && names_match(&self.name, &other.name) {
            return;
        }

        self.change_ttl(other.ttl());
        self.clear();
        for value in other.values() {
            self.add(&value);
        }
    }
}

impl RecordView for MultiValueView {
    fn kind(&self) -> RecordKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> String {
        self.values().join("\n")
    }

    fn ttl(&self) -> u32 {
        self.ttl.get()
    }

    /// Replace the contents with the newline-separated values of `value`.
    fn set_value(&self, value: &str) {
        self.clear();
        for line in split_values(value) {
            self.add(line);
        }
    }

    fn clear_value(&self) {
        self.clear();
    }

    fn change_ttl(&self, ttl: u32) {
        self.ttl.set(ttl);
        let (kind, name) = (self.kind, self.name.as_str());
        self.store
            .replace_where(|record| record.is(kind, name), |record| record.with_ttl(ttl));
    }

    fn to_host_records(&self) -> Vec<Record> {
        self.sorted_records()
    }
}
