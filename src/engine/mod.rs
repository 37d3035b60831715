mod availability;
mod calendar;
mod conflict;
mod error;
mod mutations;
mod queries;
mod selector;
mod validate;

pub use availability::{Availability, OccupancySet, build};
pub use calendar::{DayCell, DayStatus, MonthView, SelectionRole, days_in_month, next_month, prev_month};
pub use conflict::local_today;
pub use error::EngineError;
pub use queries::BookingsByStatus;
pub use selector::{RangeSelector, SelectionState, transition};
pub use validate::{describe_stay, explain_incomplete, reverify, validate, validate_endpoints};

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::limits::MAX_WRITE_RETRIES;
use crate::model::Event;
use crate::notify::NotifyHub;
use crate::observability::STORE_VERSION_CONFLICTS_TOTAL;
use crate::store::{Collection, Expected, Store, StoreError, load_typed, save_typed};

/// Booking service over a [`Store`].
///
/// Holds no state of its own beyond the store handle: every query reads the
/// current collections and every mutation is a read-modify-write of one
/// collection guarded by its version token.
pub struct Engine {
    store: Arc<dyn Store>,
    pub notify: Arc<NotifyHub>,
}

impl Engine {
    pub fn new(store: Arc<dyn Store>, notify: Arc<NotifyHub>) -> Self {
        Self { store, notify }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub(crate) async fn load_all<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, EngineError> {
        Ok(load_typed::<T>(self.store(), collection).await?.data)
    }

    /// One read-modify-write of a collection. `Ok(None)` means another
    /// writer saved in between; nothing was written and the caller may
    /// reload its inputs and try again.
    pub(crate) async fn try_update<T, R, F>(&self, collection: Collection, f: F) -> Result<Option<R>, EngineError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce(&mut Vec<T>) -> Result<R, EngineError> + Send,
        R: Send,
    {
        let loaded = load_typed::<T>(self.store(), collection).await?;
        let mut items = loaded.data;
        let out = f(&mut items)?;
        match save_typed(self.store(), collection, &items, Expected::Matches(loaded.version)).await {
            Ok(_) => Ok(Some(out)),
            Err(StoreError::VersionConflict { .. }) => {
                metrics::counter!(STORE_VERSION_CONFLICTS_TOTAL, "collection" => collection.name()).increment(1);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load a collection, let `f` edit it, save it back if nobody else wrote
    /// in between. Retries on a moved version; `f` runs once per attempt and
    /// must only touch the records it is given.
    pub(crate) async fn update_collection<T, R, F>(&self, collection: Collection, mut f: F) -> Result<R, EngineError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnMut(&mut Vec<T>) -> Result<R, EngineError> + Send,
        R: Send,
    {
        for attempt in 1..=MAX_WRITE_RETRIES {
            if let Some(out) = self.try_update::<T, R, _>(collection, &mut f).await? {
                return Ok(out);
            }
            retrying(collection, attempt);
        }
        Err(EngineError::LimitExceeded("too many concurrent writers"))
    }

    fn publish(&self, event: Event) {
        self.notify.send(&event);
    }
}

fn retrying(collection: Collection, attempt: usize) {
    tracing::warn!("{collection} changed during update (attempt {attempt}/{MAX_WRITE_RETRIES}), retrying");
}
