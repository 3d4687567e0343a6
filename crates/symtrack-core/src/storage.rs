//! The `KeyValueStore` trait and an in-memory implementation.
//!
//! Session persistence only needs string keys mapped to string values, read
//! and written synchronously. Backends (e.g. `symtrack-store-file`) implement
//! this trait; [`SessionStorage`](crate::session::SessionStorage) depends on
//! the abstraction, not on any concrete backend.

use std::{collections::BTreeMap, convert::Infallible};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A small synchronous string-to-string store.
pub trait KeyValueStore {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return the value stored under `key`, if any.
  fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

  /// Insert or overwrite `key`.
  fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error>;

  /// Delete `key`. Removing a missing key is not an error.
  fn remove(&mut self, key: &str) -> Result<(), Self::Error>;
}

// ─── Memory ──────────────────────────────────────────────────────────────────

/// A [`KeyValueStore`] that lives and dies with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  entries: BTreeMap<String, String>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl KeyValueStore for MemoryStore {
  type Error = Infallible;

  fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
    Ok(self.entries.get(key).cloned())
  }

  fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
    self.entries.insert(key.to_owned(), value.to_owned());
    Ok(())
  }

  fn remove(&mut self, key: &str) -> Result<(), Self::Error> {
    self.entries.remove(key);
    Ok(())
  }
}
