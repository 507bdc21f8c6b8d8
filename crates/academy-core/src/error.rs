//! Error types for `academy-core`.

use thiserror::Error;

use crate::{
  entity::EntityRef,
  validate::ValidationErrors,
  Id,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0}")]
  Validation(ValidationErrors),

  #[error("{0} not found")]
  NotFound(EntityRef),

  #[error("referenced {0} does not exist")]
  DanglingReference(EntityRef),

  #[error("position {position} is already taken in module {module_id}")]
  PositionTaken { module_id: Id, position: u32 },

  #[error("position {position} is out of range in module {module_id} (1 to {max})")]
  PositionOutOfRange { module_id: Id, position: u32, max: u32 },

  #[error("invalid link: {0}")]
  InvalidLink(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Whether the error was caused by caller input rather than the backend.
  pub fn is_user_error(&self) -> bool { !matches!(self, Self::Serialization(_)) }
}

impl From<ValidationErrors> for Error {
  fn from(errors: ValidationErrors) -> Self { Self::Validation(errors) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
