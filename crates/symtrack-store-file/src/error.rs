//! Error type for `symtrack-store-file`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error on {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// The file parsed as JSON but is not an object of string values.
  #[error("{0} is not a JSON object of strings")]
  InvalidFormat(PathBuf),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
