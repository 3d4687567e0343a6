//! JSON-file backend for session storage.
//!
//! Plays the role a browser's local storage plays for a web client: a flat
//! map of string keys to string values that survives restarts.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::FileStore;
