//! Persistent store layer.
//!
//! All whitelisted state lives in one namespaced JSON blob:
//!
//! ```text
//! persist:root = {"version": 1, "auth": <Session>, "cart": <Cart>}
//! token        = <raw bearer token>      (legacy)
//! user         = <User as JSON>          (legacy)
//! ```
//!
//! Each domain merge-writes only its own slice, so a cart write never
//! clobbers the session and vice versa.

mod snapshot;
mod storage;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::store::auth::Session;
use crate::store::cart::Cart;

pub use snapshot::{
    RehydrateSource, Rehydrated, Slice, LEGACY_TOKEN_KEY, LEGACY_USER_KEY, ROOT_KEY,
    SCHEMA_VERSION,
};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};

/// Reads and writes domain slices on top of a [`Storage`].
#[derive(Clone)]
pub struct Persistor {
    storage: Arc<dyn Storage>,
}

impl Persistor {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Load boot state. Never fails; unreadable state falls back to
    /// defaults and is logged.
    pub fn rehydrate(&self) -> Rehydrated {
        let rehydrated = match self.storage.read(ROOT_KEY) {
            Ok(Some(raw)) => snapshot::decode(&raw),
            Ok(None) => self.rehydrate_legacy(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted state, starting with defaults");
                Rehydrated {
                    source: RehydrateSource::Discarded {
                        reason: e.to_string(),
                    },
                    ..Rehydrated::fresh()
                }
            }
        };
        tracing::debug!(
            source = ?rehydrated.source,
            cart_lines = rehydrated.cart.len(),
            authenticated = rehydrated.session.is_authenticated(),
            "Rehydrated state"
        );
        rehydrated
    }

    fn rehydrate_legacy(&self) -> Rehydrated {
        let token = self.storage.read(LEGACY_TOKEN_KEY).ok().flatten();
        let user = self.storage.read(LEGACY_USER_KEY).ok().flatten();
        match snapshot::decode_legacy(token, user) {
            Some(session) => Rehydrated {
                session,
                source: RehydrateSource::Legacy,
                ..Rehydrated::fresh()
            },
            None => Rehydrated::fresh(),
        }
    }

    pub fn write_cart(&self, cart: &Cart) -> Result<(), StorageError> {
        self.write_slice(Slice::Cart, cart)
    }

    /// Write the session slice and mirror it into the legacy flat keys.
    pub fn write_session(&self, session: &Session) -> Result<(), StorageError> {
        self.write_slice(Slice::Auth, session)?;
        match session {
            Session::Authenticated { token, user } => {
                self.storage.write(LEGACY_TOKEN_KEY, token.expose())?;
                self.storage.write(LEGACY_USER_KEY, &encode(user)?)
            }
            Session::Anonymous => {
                self.storage.remove(LEGACY_TOKEN_KEY)?;
                self.storage.remove(LEGACY_USER_KEY)
            }
        }
    }

    /// Drop everything this layer ever wrote.
    pub fn purge(&self) -> Result<(), StorageError> {
        self.storage.remove(ROOT_KEY)?;
        self.storage.remove(LEGACY_TOKEN_KEY)?;
        self.storage.remove(LEGACY_USER_KEY)
    }

    fn write_slice<T: Serialize>(&self, slice: Slice, value: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(value).map_err(|e| encode_error(slice.key(), e))?;

        // The storage holds its lock across the whole cycle, so a writer of
        // the other slice (this process or another) cannot slip in between.
        let mut merge = |current: Option<String>| -> Result<String, StorageError> {
            // A blob from another schema version is discarded here as well:
            // its other slices must not be carried forward under our stamp.
            let mut root = current
                .and_then(|raw| snapshot::current_root(&raw).ok())
                .unwrap_or_else(snapshot::empty_root);
            root.insert(slice.key().to_string(), value.clone());
            Ok(Value::Object(root).to_string())
        };
        self.storage.update(ROOT_KEY, &mut merge)?;
        tracing::debug!(slice = slice.key(), "Persisted slice");
        Ok(())
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| encode_error(LEGACY_USER_KEY, e))
}

fn encode_error(key: &str, source: serde_json::Error) -> StorageError {
    StorageError::EncodeError {
        key: key.to_string(),
        source,
    }
}
