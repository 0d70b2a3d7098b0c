use crate::{
    ID_KEY,
    store::{DocumentStore, Filter, SortSpec, StoreError},
    value::Document,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

///
/// StoreStats
/// Per-call counters, mostly for asserting fetch behaviour in tests.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StoreStats {
    pub find_one_calls: u64,
    pub find_calls: u64,
    pub count_calls: u64,
}

impl StoreStats {
    /// Calls that returned documents.
    #[must_use]
    pub const fn fetches(&self) -> u64 {
        self.find_one_calls + self.find_calls
    }
}

#[derive(Debug, Default)]
struct Counters {
    find_one: AtomicU64,
    find: AtomicU64,
    count: AtomicU64,
}

///
/// MemoryStore
///
/// Collections of CBOR-encoded documents in insertion order. Inserting a
/// document whose `_id` already exists replaces it in place.
///

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Vec<u8>>>>,
    counters: Counters,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, collection: &str, doc: &Document) -> Result<(), StoreError> {
        let bytes = serde_cbor::to_vec(doc).map_err(|e| StoreError::Codec(e.to_string()))?;

        let mut collections = self.collections.write();
        let rows = collections.entry(collection.to_string()).or_default();

        if let Some(id) = doc.get(ID_KEY) {
            for row in rows.iter_mut() {
                if decode(row)?.get(ID_KEY) == Some(id) {
                    *row = bytes;
                    return Ok(());
                }
            }
        }
        rows.push(bytes);

        Ok(())
    }

    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections.read().get(collection).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            find_one_calls: self.counters.find_one.load(Ordering::Relaxed),
            find_calls: self.counters.find.load(Ordering::Relaxed),
            count_calls: self.counters.count.load(Ordering::Relaxed),
        }
    }

    pub fn reset_stats(&self) {
        self.counters.find_one.store(0, Ordering::Relaxed);
        self.counters.find.store(0, Ordering::Relaxed);
        self.counters.count.store(0, Ordering::Relaxed);
    }

    fn scan(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read();
        let Some(rows) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for row in rows {
            let doc = decode(row)?;
            if filter.matches(&doc) {
                out.push(doc);
            }
        }

        Ok(out)
    }
}

impl DocumentStore for MemoryStore {
    fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>, StoreError> {
        self.counters.find_one.fetch_add(1, Ordering::Relaxed);

        Ok(self.scan(collection, filter)?.into_iter().next())
    }

    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Document>, StoreError> {
        self.counters.find.fetch_add(1, Ordering::Relaxed);

        let mut docs = self.scan(collection, filter)?;
        if let Some(sort) = sort {
            docs.sort_by(|a, b| sort.compare(a, b));
        }

        Ok(docs)
    }

    fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        self.counters.count.fetch_add(1, Ordering::Relaxed);

        let matched = self.scan(collection, filter)?.len();

        Ok(u64::try_from(matched).unwrap_or(u64::MAX))
    }
}

fn decode(bytes: &[u8]) -> Result<Document, StoreError> {
    serde_cbor::from_slice(bytes).map_err(|e| StoreError::Codec(e.to_string()))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        types::{Blob, Date, ObjectId},
        value::{DbRef, Value},
    };

    #[test]
    fn documents_survive_the_codec() {
        let store = MemoryStore::new();
        let doc = Document::new()
            .with("_id", ObjectId::from_parts(1, 2))
            .with("when", Date::from_millis(42))
            .with("bytes", Blob::from(vec![0u8, 255]))
            .with("ratio", 0.25)
            .with("ref", DbRef::new("person", "P1"))
            .with("nested", Document::new().with("x", Value::Null));

        store.insert("things", &doc).unwrap();
        let back = store.find_one("things", &Filter::All).unwrap();

        assert_eq!(back, Some(doc));
    }

    #[test]
    fn insert_with_existing_id_replaces() {
        let store = MemoryStore::new();
        store
            .insert("person", &Document::new().with("_id", "P1").with("age", 1))
            .unwrap();
        store
            .insert("person", &Document::new().with("_id", "P1").with("age", 2))
            .unwrap();

        assert_eq!(store.len("person"), 1);
        let doc = store.find_one("person", &Filter::by_id("P1")).unwrap().unwrap();
        assert_eq!(doc.get("age"), Some(&Value::Int32(2)));
    }

    #[test]
    fn find_sorts_when_asked_and_keeps_insertion_order_otherwise() {
        let store = MemoryStore::new();
        for (id, age) in [("a", 3), ("b", 1), ("c", 2)] {
            store
                .insert("person", &Document::new().with("_id", id).with("age", age))
                .unwrap();
        }

        let ids = |docs: Vec<Document>| -> Vec<String> {
            docs.iter()
                .filter_map(|d| d.get("_id").and_then(Value::as_text).map(str::to_string))
                .collect()
        };

        let plain = store.find("person", &Filter::All, None).unwrap();
        assert_eq!(ids(plain), ["a", "b", "c"]);

        let sorted = store
            .find("person", &Filter::All, Some(&SortSpec::ascending("age")))
            .unwrap();
        assert_eq!(ids(sorted), ["b", "c", "a"]);
    }

    #[test]
    fn counters_track_calls() {
        let store = MemoryStore::new();
        store.find_one("x", &Filter::All).unwrap();
        store.find("x", &Filter::All, None).unwrap();
        store.count("x", &Filter::All).unwrap();

        assert_eq!(
            store.stats(),
            StoreStats {
                find_one_calls: 1,
                find_calls: 1,
                count_calls: 1
            }
        );
        assert_eq!(store.stats().fetches(), 2);

        store.reset_stats();
        assert_eq!(store.stats(), StoreStats::default());
    }
}
