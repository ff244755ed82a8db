use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use super::{HostRecord, Record, RecordKind, names_match};

/// Shared handle to the flat record collection of one domain.
///
/// Cloning the handle aliases the same records; use [`RecordStore::new`] for an
/// independent collection. The store does no locking and is confined to one thread.
/// Borrows are released before every method returns, so a handle may be used freely
/// from inside view code that holds other handles to the same store.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Rc<RefCell<Vec<Record>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Whether both handles point at the same collection.
    pub fn same_store(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.records, &other.records)
    }

    pub fn push(&self, record: Record) {
        self.records.borrow_mut().push(record);
    }

    /// Append `records` through a shared handle.
    pub fn extend_records(&self, records: impl IntoIterator<Item = Record>) {
        self.records.borrow_mut().extend(records);
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }

    /// Copy of every record, in insertion order.
    pub fn snapshot(&self) -> Vec<Record> {
        self.records.borrow().clone()
    }

    /// Records in the `(kind, name)` slot.
    pub fn matching(&self, kind: RecordKind, name: &str) -> Vec<Record> {
        self.filtered(|record| record.is(kind, name))
    }

    /// Records of any kind for `name`.
    pub fn for_name(&self, name: &str) -> Vec<Record> {
        self.filtered(|record| names_match(record.name(), name))
    }

    pub fn filtered(&self, mut predicate: impl FnMut(&Record) -> bool) -> Vec<Record> {
        self.records
            .borrow()
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    pub fn any(&self, predicate: impl FnMut(&Record) -> bool) -> bool {
        self.records.borrow().iter().any(predicate)
    }

    /// Remove every record matching `predicate`, returning how many were removed.
    pub fn remove_where(&self, mut predicate: impl FnMut(&Record) -> bool) -> usize {
        let mut records = self.records.borrow_mut();
        let before = records.len();
        records.retain(|record| !predicate(record));
        before - records.len()
    }

    /// Replace every record matching `predicate` with `replace(record)`.
    pub fn replace_where(
        &self,
        mut predicate: impl FnMut(&Record) -> bool,
        mut replace: impl FnMut(&Record) -> Record,
    ) -> usize {
        let mut replaced = 0;
        for record in self.records.borrow_mut().iter_mut() {
            if predicate(record) {
                *record = replace(record);
                replaced += 1;
            }
        }
        replaced
    }

    /// Distinct host names present, lower-cased and sorted.
    pub fn names(&self) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .map(|record| record.name().to_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl FromIterator<Record> for RecordStore {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: Rc::new(RefCell::new(iter.into_iter().collect())),
        }
    }
}

impl Extend<Record> for RecordStore {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        self.extend_records(iter);
    }
}
