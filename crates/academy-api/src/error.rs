//! API error type and [`axum::response::IntoResponse`] implementation.

use academy_core::{EntityRef, store::StoreError, validate::ValidationErrors};
use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A draft failed field validation.
  #[error("{0}")]
  Validation(ValidationErrors),

  /// The request was well-formed but breaks a referential or uniqueness rule.
  #[error("{0}")]
  Unprocessable(String),

  /// A restricted delete was refused.
  #[error("{reason}")]
  Conflict {
    reason:     String,
    dependents: Vec<EntityRef>,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error: caller mistakes become 4xx, anything else 500.
  pub fn store<E: StoreError>(e: E) -> Self {
    match e.user_error() {
      Some(academy_core::Error::Validation(errors)) => Self::Validation(errors.clone()),
      Some(academy_core::Error::NotFound(target)) => Self::NotFound(format!("{target} not found")),
      Some(other) => Self::Unprocessable(other.to_string()),
      None => Self::Store(Box::new(e)),
    }
  }

  pub fn missing(target: EntityRef) -> Self { Self::NotFound(format!("{target} not found")) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, Json(json!({ "error": m }))),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))),
      ApiError::Validation(errors) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": errors.banner(), "fields": errors })),
      ),
      ApiError::Unprocessable(m) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": m, "fields": [] })),
      ),
      ApiError::Conflict { reason, dependents } => (
        StatusCode::CONFLICT,
        Json(json!({ "error": reason, "dependents": dependents })),
      ),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
      }
    }
    .into_response()
  }
}
