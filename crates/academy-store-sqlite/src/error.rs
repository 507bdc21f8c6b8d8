//! Error type for `academy-store-sqlite`.

use academy_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Core(#[from] academy_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A stored column could not be decoded.
  #[error("decode error: {0}")]
  Decode(String),
}

impl From<academy_core::validate::ValidationErrors> for Error {
  fn from(errors: academy_core::validate::ValidationErrors) -> Self {
    Self::Core(errors.into())
  }
}

impl StoreError for Error {
  fn core(&self) -> Option<&academy_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
