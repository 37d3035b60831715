//! Persistence collaborator: named JSON collections with a version token.
//!
//! A collection is one JSON document (an array of records). Every load hands
//! back the document together with the version it was read at; a save can
//! insist that the stored version has not moved since, which is how the
//! engine detects a concurrent writer.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use std::fmt;
use std::io;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// CRC32 of the compact serialization of a collection.
pub type Version = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Houses,
    Bookings,
    Holidays,
    Users,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Houses,
        Collection::Bookings,
        Collection::Holidays,
        Collection::Users,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Houses => "houses",
            Collection::Bookings => "bookings",
            Collection::Holidays => "holidays",
            Collection::Users => "users",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A document plus the version it was read at. `None` = never saved.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub data: T,
    pub version: Option<Version>,
}

/// Precondition on a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// Overwrite whatever is there.
    Any,
    /// Only write if the stored version is still this one.
    Matches(Option<Version>),
}

impl Expected {
    pub(crate) fn check(&self, collection: Collection, found: Option<Version>) -> Result<(), StoreError> {
        match *self {
            Expected::Any => Ok(()),
            Expected::Matches(expected) if expected == found => Ok(()),
            Expected::Matches(expected) => Err(StoreError::VersionConflict {
                collection,
                expected,
                found,
            }),
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    Io {
        collection: Collection,
        source: io::Error,
    },
    Corrupt {
        collection: Collection,
        reason: String,
    },
    VersionConflict {
        collection: Collection,
        expected: Option<Version>,
        found: Option<Version>,
    },
    Serialization(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { collection, source } => {
                write!(f, "I/O error on collection {collection}: {source}")
            }
            StoreError::Corrupt { collection, reason } => {
                write!(f, "collection {collection} is corrupt: {reason}")
            }
            StoreError::VersionConflict {
                collection,
                expected,
                found,
            } => write!(
                f,
                "collection {collection} changed concurrently (expected version {expected:?}, found {found:?})"
            ),
            StoreError::Serialization(e) => write!(f, "serialization error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            StoreError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e)
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Load a collection. A collection that was never saved is an empty array.
    async fn load(&self, collection: Collection) -> Result<Versioned<Value>, StoreError>;

    /// Replace a collection, returning its new version.
    async fn save(
        &self,
        collection: Collection,
        value: Value,
        expected: Expected,
    ) -> Result<Version, StoreError>;
}

pub fn version_of(value: &Value) -> Result<Version, StoreError> {
    let bytes = serde_json::to_vec(value)?;
    Ok(crc32fast::hash(&bytes))
}

pub async fn load_typed<T: DeserializeOwned>(
    store: &dyn Store,
    collection: Collection,
) -> Result<Versioned<Vec<T>>, StoreError> {
    let Versioned { data, version } = store.load(collection).await?;
    let data = serde_json::from_value(data).map_err(|e| StoreError::Corrupt {
        collection,
        reason: e.to_string(),
    })?;
    Ok(Versioned { data, version })
}

pub async fn save_typed<T: Serialize + Sync>(
    store: &dyn Store,
    collection: Collection,
    items: &[T],
    expected: Expected,
) -> Result<Version, StoreError> {
    let value = serde_json::to_value(items)?;
    store.save(collection, value, expected).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn version_is_stable_for_equal_documents() {
        let a = json!([{"id": "b1", "from": "2024-11-10"}]);
        let b = json!([{"from": "2024-11-10", "id": "b1"}]);
        assert_eq!(version_of(&a).unwrap(), version_of(&b).unwrap());
        assert_ne!(version_of(&a).unwrap(), version_of(&json!([])).unwrap());
    }

    #[test]
    fn expected_check() {
        let c = Collection::Bookings;
        assert!(Expected::Any.check(c, Some(7)).is_ok());
        assert!(Expected::Matches(None).check(c, None).is_ok());
        assert!(Expected::Matches(Some(7)).check(c, Some(7)).is_ok());
        assert!(matches!(
            Expected::Matches(None).check(c, Some(7)),
            Err(StoreError::VersionConflict { found: Some(7), .. })
        ));
    }

    #[test]
    fn collection_files() {
        assert_eq!(Collection::Holidays.file_name(), "holidays.json");
        assert_eq!(Collection::ALL.len(), 4);
    }
}
