use std::cell::Cell;

use super::RecordView;
use crate::records::{HostRecord, Record, RecordKind, RecordStore, names_match};

/// Accessor for kinds with at most one record per host name (`CNAME`, `MXE`, redirects).
#[derive(Debug)]
pub struct SingleValueView {
    store: RecordStore,
    kind: RecordKind,
    name: String,
    owns_store: bool,
    ttl: Cell<u32>,
    preference: u32,
}

impl SingleValueView {
    /// View over a shared store, taking its hints from the existing record if any.
    pub fn new(store: &RecordStore, kind: RecordKind, name: impl Into<String>) -> Self {
        Self::with_hints(store, kind, name, None, None)
    }

    pub fn with_hints(
        store: &RecordStore,
        kind: RecordKind,
        name: impl Into<String>,
        ttl: Option<u32>,
        preference: Option<u32>,
    ) -> Self {
        Self::build(store.clone(), false, kind, name.into(), ttl, preference)
    }

    /// Empty view over its own private store.
    pub fn standalone(kind: RecordKind, name: impl Into<String>) -> Self {
        Self::build(RecordStore::new(), true, kind, name.into(), None, None)
    }

    /// Private view seeded with one record.
    pub fn standalone_with_value(
        kind: RecordKind,
        name: impl Into<String>,
        value: &str,
        ttl: Option<u32>,
        preference: Option<u32>,
    ) -> Self {
        let view = Self::build(RecordStore::new(), true, kind, name.into(), ttl, preference);
        view.set_value(value);
        view
    }

    fn build(
        store: RecordStore,
        owns_store: bool,
        kind: RecordKind,
        name: String,
        ttl: Option<u32>,
        preference: Option<u32>,
    ) -> Self {
        let existing = store.matching(kind, &name).into_iter().next();
        let ttl = ttl
            .or_else(|| existing.as_ref().map(|record| record.ttl()))
            .unwrap_or_else(|| kind.default_ttl());
        let preference = if kind.uses_preference() {
            preference.unwrap_or_else(|| kind.default_preference())
        } else {
            0
        };

        Self {
            store,
            kind,
            name,
            owns_store,
            ttl: Cell::new(ttl),
            preference,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Whether the store was created by (and is private to) this view.
    pub fn owns_store(&self) -> bool {
        self.owns_store
    }

    pub fn preference(&self) -> u32 {
        self.preference
    }

    fn instance(&self) -> Option<Record> {
        self.store.matching(self.kind, &self.name).into_iter().next()
    }

    fn remove_instances(&self) {
        let (kind, name) = (self.kind, self.name.as_str());
        self.store.remove_where(|record| record.is(kind, name));
    }

    /// View for `name` carrying `value`.
    ///
    /// A private view yields a new independent view. A view over a shared store yields
    /// a view over the same store and writes `value` into it immediately.
    pub fn create(&self, name: &str, value: &str, ttl: u32, preference: u32) -> Self {
        if self.owns_store {
            return Self::standalone_with_value(
                self.kind,
                name,
                value,
                Some(ttl),
                Some(preference),
            );
        }

        let view = Self::with_hints(&self.store, self.kind, name, Some(ttl), Some(preference));
        view.set_value(value);
        view
    }

    /// Make this view mirror `other` (TTL and value). No-op for the same slot.
    pub fn copy_from(&self, other: &Self) {
        if self.store.same_store(&other.store) && names_match(&self.name, &other.name) {
            return;
        }

        self.change_ttl(other.ttl());
        let value = other.value();
        if value.trim().is_empty() {
            self.clear_value();
        } else {
            self.set_value(&value);
        }
    }
}

impl RecordView for SingleValueView {
    fn kind(&self) -> RecordKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> String {
        self.instance()
            .map(|record| record.value().into_owned())
            .unwrap_or_default()
    }

    fn ttl(&self) -> u32 {
        self.ttl.get()
    }

    fn set_value(&self, value: &str) {
        self.remove_instances();
        self.store.push(Record::new(
            self.kind,
            &self.name,
            value,
            self.ttl.get(),
            self.preference,
        ));
    }

    fn clear_value(&self) {
        self.remove_instances();
    }

    fn change_ttl(&self, ttl: u32) {
        self.ttl.set(ttl);
        let (kind, name) = (self.kind, self.name.as_str());
        self.store
            .replace_where(|record| record.is(kind, name), |record| record.with_ttl(ttl));
    }

    fn to_host_records(&self) -> Vec<Record> {
        self.instance().into_iter().collect()
    }
}
