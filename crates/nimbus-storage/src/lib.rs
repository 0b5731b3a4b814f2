//! Persistent key-value state for Nimbus.
//!
//! A [`Storage`] handle wraps one [`KeyValueStore`] backend and exposes typed,
//! JSON-serialized reads and writes that never fail loudly: storage problems
//! are logged and reported as a default value or `false`. Construct a single
//! handle at startup and pass clones to whatever needs persistence.

pub mod backend;
pub mod helpers;
pub mod keys;
pub mod storage;

pub use backend::{JsonFileStore, KeyValueStore, MemoryStore, NoopStore, StorageError};
pub use helpers::{CardGrid, LastLocation, MAX_SEARCH_HISTORY};
pub use storage::Storage;
