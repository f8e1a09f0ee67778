//! In-memory, append-only callback store.
//!
//! One writer lock guards the whole record vector. Sequence ids are assigned
//! and receive timestamps stamped inside that critical section, so ids are
//! gapless 1-based and timestamps never decrease in append order, no matter
//! how many requests race.

use std::sync::{Arc, RwLock};

use chrono::Utc;

use crate::error::{Error, Result};
use crate::model::{CallbackDraft, CallbackRecord};

/// Append-only store of received callbacks.
///
/// Records are never mutated or removed; readers get cheap `Arc` clones.
/// A read that runs after an append returns has that append visible
/// (single process, single lock).
#[derive(Debug, Default)]
pub struct CallbackStore {
    records: RwLock<Vec<Arc<CallbackRecord>>>,
}

impl CallbackStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a callback, assigning the next sequence id and stamping the
    /// receive time.
    ///
    /// `sequence_id` is `len + 1` under the write lock, which makes it both
    /// gapless and equal to the post-append count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the lock is poisoned.
    pub fn append(&self, draft: CallbackDraft) -> Result<Arc<CallbackRecord>> {
        let mut records = self.records.write().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;

        let sequence_id = records.len() as u64 + 1;
        let record = Arc::new(CallbackRecord {
            sequence_id,
            received_at: Utc::now(),
            api_key_provided: draft.api_key_provided,
            payload: draft.payload,
            headers: draft.headers,
        });

        records.push(Arc::clone(&record));
        Ok(record)
    }

    /// Returns all records in arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the lock is poisoned.
    pub fn all(&self) -> Result<Vec<Arc<CallbackRecord>>> {
        let records = self.records.read().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;
        Ok(records.clone())
    }

    /// Returns the most recently appended record, or `None` when empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the lock is poisoned.
    pub fn latest(&self) -> Result<Option<Arc<CallbackRecord>>> {
        let records = self.records.read().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;
        Ok(records.last().cloned())
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the lock is poisoned.
    pub fn count(&self) -> Result<u64> {
        let records = self.records.read().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;
        Ok(records.len() as u64)
    }
}
