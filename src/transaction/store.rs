//! Storage interface for the cross-request transaction context. The engine
//! treats the store as externally atomic per key and always re-reads before
//! deciding whether to resume or start fresh.

use std::sync::Mutex;

use serde_json::Value;

use crate::error::Error;
use crate::transaction::TransactionMeta;

/// Durable storage injected into the engine. Implementations typically wrap
/// cookies, session storage, or a server-side session record.
pub trait TransactionStore: Send + Sync {
    fn exists(&self) -> bool;

    /// Load the persisted meta, if any. Validity is checked by the caller.
    ///
    /// # Errors
    /// Returns an error if the storage medium fails.
    fn load(&self) -> Result<Option<TransactionMeta>, Error>;

    /// # Errors
    /// Returns an error if the storage medium fails.
    fn save(&self, meta: &TransactionMeta) -> Result<(), Error>;

    /// Clear meta and any saved response.
    ///
    /// # Errors
    /// Returns an error if the storage medium fails.
    fn clear(&self) -> Result<(), Error>;

    /// Persist the latest remediation response for resumption.
    ///
    /// # Errors
    /// Returns an error if the storage medium fails.
    fn save_response(&self, raw: &Value) -> Result<(), Error>;

    /// # Errors
    /// Returns an error if the storage medium fails.
    fn load_response(&self) -> Result<Option<Value>, Error>;
}

impl<T: TransactionStore + ?Sized> TransactionStore for std::sync::Arc<T> {
    fn exists(&self) -> bool {
        (**self).exists()
    }

    fn load(&self) -> Result<Option<TransactionMeta>, Error> {
        (**self).load()
    }

    fn save(&self, meta: &TransactionMeta) -> Result<(), Error> {
        (**self).save(meta)
    }

    fn clear(&self) -> Result<(), Error> {
        (**self).clear()
    }

    fn save_response(&self, raw: &Value) -> Result<(), Error> {
        (**self).save_response(raw)
    }

    fn load_response(&self) -> Result<Option<Value>, Error> {
        (**self).load_response()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    meta: Option<TransactionMeta>,
    response: Option<Value>,
}

/// In-memory store for tests and embedders without a durable medium.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn locked<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> Result<T, Error> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::Storage("memory store poisoned".to_string()))?;
        Ok(f(&mut state))
    }
}

impl TransactionStore for MemoryStore {
    fn exists(&self) -> bool {
        self.locked(|state| state.meta.is_some()).unwrap_or(false)
    }

    fn load(&self) -> Result<Option<TransactionMeta>, Error> {
        self.locked(|state| state.meta.clone())
    }

    fn save(&self, meta: &TransactionMeta) -> Result<(), Error> {
        self.locked(|state| state.meta = Some(meta.clone()))
    }

    fn clear(&self) -> Result<(), Error> {
        self.locked(|state| {
            state.meta = None;
            state.response = None;
        })
    }

    fn save_response(&self, raw: &Value) -> Result<(), Error> {
        self.locked(|state| state.response = Some(raw.clone()))
    }

    fn load_response(&self) -> Result<Option<Value>, Error> {
        self.locked(|state| state.response.clone())
    }
}
