//! Error types for `symtrack-client`.

use reqwest::StatusCode;
use symtrack_core::form::FormError;
use thiserror::Error;

/// A failed API call.
#[derive(Debug, Error)]
pub enum ClientError {
  #[error("failed to build HTTP client: {0}")]
  Build(#[source] reqwest::Error),

  /// The request never produced a response (refused, timed out, DNS...).
  #[error("{endpoint} failed: {source}")]
  Transport {
    endpoint: String,
    #[source]
    source:   reqwest::Error,
  },

  /// The server answered with a non-success status.
  #[error("{endpoint} → {status}")]
  Rejected {
    endpoint: String,
    status:   StatusCode,
    /// Human-readable message from the response body, if it had one.
    message:  Option<String>,
  },

  /// A bearer-authenticated request came back 401 or 403.
  #[error("session expired ({status})")]
  SessionExpired { status: StatusCode },

  /// A success response whose body did not have the expected shape.
  #[error("decoding {endpoint}: {source}")]
  Decode {
    endpoint: String,
    #[source]
    source:   serde_json::Error,
  },
}

impl ClientError {
  /// The server-supplied message of a [`ClientError::Rejected`].
  pub fn server_message(&self) -> Option<&str> {
    match self {
      Self::Rejected { message, .. } => message.as_deref(),
      _ => None,
    }
  }

  pub fn is_session_expired(&self) -> bool {
    matches!(self, Self::SessionExpired { .. })
  }
}

/// A failed [`Tracker`](crate::Tracker) operation. The tracker has already
/// put a user-facing message in its banner by the time this is returned.
#[derive(Debug, Error)]
pub enum TrackerError {
  #[error(transparent)]
  Form(#[from] FormError),

  #[error(transparent)]
  Client(#[from] ClientError),

  #[error("not logged in")]
  NotAuthenticated,

  #[error("no symptom with id {0}")]
  UnknownSymptom(i64),
}
