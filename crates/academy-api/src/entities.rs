//! CRUD handlers shared by every entity collection.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/{collection}` | Optional `text`, `category`, `owner`, `sort` |
//! | `POST`   | `/{collection}` | Body: the entity draft; returns 201 |
//! | `PUT`    | `/{collection}/{id}` | Body: the entity draft; 404 if not found |
//! | `DELETE` | `/{collection}/{id}` | `?cascade=true` removes dependents; 409 if blocked |
//!
//! `GET /{collection}/{id}` returns a read model; see [`crate::details`].

use std::sync::Arc;

use academy_core::{
  Entity, EntityRef, Id,
  query::{ListQuery, SortKey},
  store::{AcademyStore, DeleteOutcome, DeletePolicy},
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub text:     Option<String>,
  /// Status for programs and modules, type for achievements and curriculum.
  pub category: Option<String>,
  /// Owning program, module or organization.
  pub owner:    Option<Id>,
  pub sort:     Option<SortKey>,
}

impl From<ListParams> for ListQuery {
  fn from(params: ListParams) -> Self {
    ListQuery {
      text:     params.text,
      category: params.category,
      owner_id: params.owner,
      sort:     params.sort,
    }
  }
}

/// `GET /{collection}[?text=..][&category=..][&owner=..][&sort=..]`
pub async fn list<S, E>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<E>>, ApiError>
where
  S: AcademyStore,
  E: Entity,
{
  let rows = store.list::<E>().await.map_err(ApiError::store)?;
  Ok(Json(ListQuery::from(params).apply(rows)))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /{collection}`: body: the entity draft.
pub async fn create<S, E>(
  State(store): State<Arc<S>>,
  Json(draft): Json<E::Draft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AcademyStore,
  E: Entity,
{
  let row: E = store.insert(draft).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(row)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /{collection}/{id}`: body: the entity draft.
pub async fn update<S, E>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Json(draft): Json<E::Draft>,
) -> Result<Json<E>, ApiError>
where
  S: AcademyStore,
  E: Entity,
{
  store
    .update::<E>(id, draft)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| ApiError::missing(EntityRef::new(E::KIND, id)))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
  #[serde(default)]
  pub cascade: bool,
}

/// `DELETE /{collection}/{id}[?cascade=true]`
pub async fn remove<S, E>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Query(params): Query<DeleteParams>,
) -> Result<Json<DeleteOutcome>, ApiError>
where
  S: AcademyStore,
  E: Entity,
{
  let outcome = store
    .remove::<E>(id, DeletePolicy::cascade(params.cascade))
    .await
    .map_err(ApiError::store)?;
  match outcome {
    DeleteOutcome::NotFound => Err(ApiError::missing(EntityRef::new(E::KIND, id))),
    DeleteOutcome::Blocked { reason, dependents } => Err(ApiError::Conflict { reason, dependents }),
    removed => Ok(Json(removed)),
  }
}

/// Fetch a record or fail with 404.
pub async fn require<S, E>(store: &S, id: Id) -> Result<E, ApiError>
where
  S: AcademyStore,
  E: Entity,
{
  store
    .get::<E>(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::missing(EntityRef::new(E::KIND, id)))
}
