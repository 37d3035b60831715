use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;

use super::{Collection, Expected, Store, StoreError, Version, Versioned, version_of};

/// Process-local store. Nothing survives a restart.
pub struct MemoryStore {
    collections: DashMap<Collection, Versioned<Value>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(&self, collection: Collection) -> Result<Versioned<Value>, StoreError> {
        Ok(self
            .collections
            .get(&collection)
            .map(|e| e.value().clone())
            .unwrap_or_else(|| Versioned {
                data: Value::Array(Vec::new()),
                version: None,
            }))
    }

    async fn save(
        &self,
        collection: Collection,
        value: Value,
        expected: Expected,
    ) -> Result<Version, StoreError> {
        let version = version_of(&value)?;
        let doc = Versioned {
            data: value,
            version: Some(version),
        };
        // The entry holds the shard lock, so check-and-set is atomic.
        match self.collections.entry(collection) {
            Entry::Occupied(mut e) => {
                expected.check(collection, e.get().version)?;
                e.insert(doc);
            }
            Entry::Vacant(e) => {
                expected.check(collection, None)?;
                e.insert(doc);
            }
        }
        Ok(version)
    }
}
