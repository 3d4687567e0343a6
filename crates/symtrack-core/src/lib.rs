//! Core types for the symptom tracker client.
//!
//! This crate is deliberately free of HTTP and terminal dependencies. It holds
//! the wire types, the form state that feeds them, and the key-value storage
//! abstraction that session persistence sits on.

pub mod error;
pub mod form;
pub mod session;
pub mod storage;
pub mod symptom;
pub mod user;

pub use error::{Error, Result};
