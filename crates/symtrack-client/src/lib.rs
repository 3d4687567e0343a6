//! HTTP client and UI-agnostic controller for the symptom tracker API.
//!
//! [`ApiClient`] is a thin typed wrapper over the REST endpoints.
//! [`Tracker`] owns everything a front-end shows (session, symptom list,
//! pattern list, forms, error banner) and turns user actions into requests.
//! Front-ends only render its state and forward input.

pub mod client;
pub mod error;
pub mod tracker;

pub use client::{ApiClient, ApiConfig};
pub use error::{ClientError, TrackerError};
pub use tracker::{AuthMode, Tracker, View};

#[cfg(test)]
mod tests;
