//! Creation under a parent record and curriculum ordering.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/modules?programId=N` | Pre-fills the program when the body has none |
//! | `GET`  | `/modules/{id}/curriculum` | Items ordered by position |
//! | `POST` | `/modules/{id}/curriculum` | Module from the path; next free position when absent |
//! | `POST` | `/curriculum/{id}/move` | Body: `{"direction":"up"\|"down"}` |

use std::sync::Arc;

use academy_core::{
  Id,
  curriculum::{CurriculumItem, CurriculumItemDraft, Direction},
  program::{Module, ModuleDraft},
  store::AcademyStore,
};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::{entities::require, error::ApiError};

// ─── Modules ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleParams {
  pub program_id: Option<Id>,
}

/// `POST /modules[?programId=N]`
pub async fn create_module<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ModuleParams>,
  Json(mut draft): Json<ModuleDraft>,
) -> Result<impl IntoResponse, ApiError> {
  if draft.program_id == 0
    && let Some(program_id) = params.program_id
  {
    draft.program_id = program_id;
  }
  let module: Module = store.insert(draft).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(module)))
}

// ─── Curriculum ──────────────────────────────────────────────────────────────

/// `GET /modules/{id}/curriculum`
pub async fn list_curriculum<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(module_id): Path<Id>,
) -> Result<Json<Vec<CurriculumItem>>, ApiError> {
  require::<S, Module>(&store, module_id).await?;
  let mut items = store
    .children::<CurriculumItem>(module_id)
    .await
    .map_err(ApiError::store)?;
  items.sort_by_key(|i| i.position);
  Ok(Json(items))
}

/// `POST /modules/{id}/curriculum`: body: a curriculum item draft, with
/// `module_id` and optionally `position` omitted. Without a position the
/// store appends the item in the same write that assigns its id.
pub async fn create_curriculum<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(module_id): Path<Id>,
  Json(mut draft): Json<CurriculumItemDraft>,
) -> Result<impl IntoResponse, ApiError> {
  require::<S, Module>(&store, module_id).await?;
  draft.module_id = module_id;
  let item: CurriculumItem = store.insert(draft).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize)]
pub struct MoveBody {
  pub direction: Direction,
}

#[derive(Debug, Serialize)]
pub struct Moved {
  pub moved: bool,
}

/// `POST /curriculum/{id}/move`: `moved` is false at either end of the
/// module.
pub async fn move_item<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Json(body): Json<MoveBody>,
) -> Result<Json<Moved>, ApiError> {
  require::<S, CurriculumItem>(&store, id).await?;
  let moved = store
    .move_item(id, body.direction)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(Moved { moved }))
}
