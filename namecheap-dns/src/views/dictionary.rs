use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::RecordSet;
use crate::records::{HostRecord, Record, RecordStore, names_match};

/// Host name to [`RecordSet`] map over one store.
///
/// Sets are created on first lookup and cached, even for names without records. Keys
/// and membership always come from the store itself, so a cached empty set is not a key.
#[derive(Debug, Default)]
pub struct RecordDictionary {
    store: RecordStore,
    sets: RefCell<BTreeMap<String, Rc<RecordSet>>>,
}

impl RecordDictionary {
    pub fn new(store: &RecordStore) -> Self {
        Self {
            store: store.clone(),
            sets: RefCell::default(),
        }
    }

    /// Dictionary over its own private store.
    pub fn standalone() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Distinct lower-cased host names present in the store, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.store.names()
    }

    /// Number of distinct host names present in the store.
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Whether the store holds at least one record for `name`.
    pub fn contains_key(&self, name: &str) -> bool {
        self.store.any(|record| names_match(record.name(), name))
    }

    /// The set for `name`, creating and caching it when needed.
    pub fn get(&self, name: &str) -> Rc<RecordSet> {
        let key = name.to_lowercase();
        let mut sets = self.sets.borrow_mut();
        Rc::clone(
            sets.entry(key)
                .or_insert_with_key(|key| Rc::new(RecordSet::new(&self.store, key.as_str()))),
        )
    }

    /// Replace the records of `name` with a copy of `set`.
    pub fn set(&self, name: &str, set: &RecordSet) {
        self.get(name).copy_from(set);
    }

    pub fn insert(&self, name: &str, set: &RecordSet) {
        self.set(name, set);
    }

    /// Delete every record of `name` and drop its cached set.
    pub fn remove(&self, name: &str) -> bool {
        let current = self.get(name);
        current.clear();
        self.sets.borrow_mut().remove(current.name());
        true
    }

    /// Sets for every key, in key order.
    pub fn values(&self) -> Vec<Rc<RecordSet>> {
        self.keys().iter().map(|key| self.get(key)).collect()
    }

    /// Empty the whole store and the cache.
    pub fn clear(&self) {
        self.store.clear();
        self.sets.borrow_mut().clear();
    }

    /// Cross-kind and field-level validation of every host name.
    ///
    /// Messages are prefixed with `Host: {name}, ` and, for field errors, `Type: {kind}, `.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for key in self.keys() {
            let set = self.get(&key);
            errors.extend(
                set.errors()
                    .into_iter()
                    .map(|error| format!("Host: {key}, {error}")),
            );

            let mut records = set.records();
            records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
            for record in &records {
                let kind = record.kind();
                errors.extend(
                    record
                        .validate()
                        .into_iter()
                        .map(|error| format!("Host: {key}, Type: {kind}, {error}")),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// All records ordered by name, then kind, preference and value.
    pub fn to_host_records(&self) -> Vec<Record> {
        let mut records = self.store.snapshot();
        records.sort_by(|a, b| {
            a.name()
                .to_lowercase()
                .cmp(&b.name().to_lowercase())
                .then_with(|| a.sort_key().cmp(&b.sort_key()))
        });
        records
    }
}
