use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::observability::STORE_LOAD_DURATION_SECONDS;

use super::{Collection, Expected, Store, StoreError, Version, Versioned, version_of};

/// One pretty-printed `<collection>.json` file per collection under `dir`.
///
/// Reads go through a cache filled on first load. Writes are serialized by a
/// single lock, land in `<collection>.json.tmp` and are renamed over the
/// live file, so a crash mid-write leaves the previous document intact.
pub struct JsonFileStore {
    dir: PathBuf,
    cache: DashMap<Collection, Versioned<Value>>,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: DashMap::new(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(collection.file_name())
    }

    async fn read_file(&self, collection: Collection) -> Result<Versioned<Value>, StoreError> {
        let path = self.path_for(collection);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Versioned {
                    data: Value::Array(Vec::new()),
                    version: None,
                });
            }
            Err(source) => return Err(StoreError::Io { collection, source }),
        };
        let data: Value = serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            collection,
            reason: e.to_string(),
        })?;
        if !data.is_array() {
            return Err(StoreError::Corrupt {
                collection,
                reason: "top-level value is not an array".into(),
            });
        }
        let version = version_of(&data)?;
        Ok(Versioned {
            data,
            version: Some(version),
        })
    }

    /// Cache a document read from disk, unless a save cached a newer one
    /// while the read was in flight. Returns whichever copy is cached.
    fn fill_cache(&self, collection: Collection, doc: Versioned<Value>) -> Versioned<Value> {
        self.cache.entry(collection).or_insert(doc).value().clone()
    }

    async fn write_file(&self, collection: Collection, value: &Value) -> Result<(), StoreError> {
        let path = self.path_for(collection);
        let tmp_path = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(value)?;
        let io_err = |source| StoreError::Io { collection, source };

        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        tokio::fs::write(&tmp_path, &body).await.map_err(io_err)?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn load(&self, collection: Collection) -> Result<Versioned<Value>, StoreError> {
        if let Some(doc) = self.cache.get(&collection) {
            return Ok(doc.value().clone());
        }
        let started = Instant::now();
        let doc = self.read_file(collection).await?;
        metrics::histogram!(STORE_LOAD_DURATION_SECONDS, "collection" => collection.name())
            .record(started.elapsed().as_secs_f64());
        tracing::debug!("loaded {collection} (version {:?})", doc.version);
        Ok(self.fill_cache(collection, doc))
    }

    async fn save(
        &self,
        collection: Collection,
        value: Value,
        expected: Expected,
    ) -> Result<Version, StoreError> {
        let _guard = self.write_lock.lock().await;
        let current = self.load(collection).await?;
        expected.check(collection, current.version)?;

        let version = version_of(&value)?;
        self.write_file(collection, &value).await?;
        self.cache.insert(
            collection,
            Versioned {
                data: value,
                version: Some(version),
            },
        );
        tracing::debug!("saved {collection} (version {version})");
        Ok(version)
    }
}
