//! Durable key/value storage for session and cart state.
//!
//! The shop keeps everything it must remember between runs (auth token,
//! cart, selected category) under a handful of string keys, the same way a
//! browser keeps them in `localStorage`. [`KeyValueStore`] is that seam:
//!
//! - [`FileStore`] - one JSON object on disk, rewritten after every mutation
//! - [`MemoryStore`] - process-local map for tests and throwaway sessions
//!
//! There is no locking between processes sharing one file: last writer wins.

mod file;
mod memory;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage keys shared with the web storefront.
pub mod keys {
    /// Bearer token returned by login.
    pub const AUTH_TOKEN: &str = "authToken";

    /// Role of the logged-in user (`admin` or `cliente`).
    pub const USER_ROLE: &str = "userRole";

    /// Display name of the logged-in user.
    pub const USER_NAME: &str = "userName";

    /// Avatar URL of the logged-in user.
    pub const USER_AVATAR: &str = "userAvatar";

    /// JSON-serialized array of cart line items.
    pub const CART: &str = "cart";

    /// Category filter last chosen in the catalog.
    pub const SELECTED_CATEGORY: &str = "categoriaSeleccionada";

    /// Reserved for receipt printer pairing.
    pub const SELECTED_PRINTER: &str = "selectedPrinter";

    /// Reserved for the receipt printer bridge URL.
    pub const API_PRINTER: &str = "apiPrinter";
}

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error at {}: {source}", path.display())]
    Io {
        /// File that could not be accessed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file exists but is not a JSON object of strings.
    #[error("storage file {} is corrupt: {source}", path.display())]
    Corrupt {
        /// File that failed to parse.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be serialized for storage.
    #[error("failed to serialize value for key {key}: {source}")]
    Serialize {
        /// Key being written.
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A string key/value store that survives between sessions.
///
/// Reads are served from memory; every `set`/`remove` is durable by the
/// time it returns.
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value could not be persisted.
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the deletion could not be persisted.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Store handle shared by the session and cart stores.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Serialize `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns `StorageError::Serialize` if `value` cannot be encoded, or any
/// error from the backend write.
pub fn set_json<T: serde::Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let encoded = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_owned(),
        source,
    })?;
    store.set(key, encoded)
}
