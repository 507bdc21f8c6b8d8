//! Handlers for associations between records.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/{programs\|modules\|curriculum}/{id}/achievements` | Resolved, with `is_default` |
//! | `POST`   | `/{programs\|modules\|curriculum\|students}/{id}/achievements` | Body: `{"ids":[..]}` |
//! | `DELETE` | `/{..}/{id}/achievements/{aid}` | 404 if not linked |
//! | `PUT`    | `/{programs\|modules}/{id}/achievements/{aid}/default` | Body: `{"is_default":bool}` |
//! | `GET`    | `/students/{id}/achievements` | Earned, with `earned_at` |
//! | `GET`/`POST` | `/students/{id}/parents` | |
//! | `DELETE` | `/students/{id}/parents/{pid}` | |
//! | `GET`/`POST` | `/students/{id}/programs` | Enrollments with progress |
//! | `DELETE` | `/students/{id}/programs/{pid}` | |
//! | `PUT`    | `/students/{id}/programs/{pid}/progress` | Body: `{"progress":0..=100}` |
//! | `GET`    | `/parents/{id}/students` | |

use std::sync::Arc;

use academy_core::{
  Entity, EntityKind, EntityRef, Id,
  link::{AttachReport, LinkKind, attach_all},
  people::{Parent, Student},
  store::AcademyStore,
  view::{self, EarnedAchievement, Enrollment, LinkedAchievement},
};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::Deserialize;

use crate::{entities::require, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct AttachBody {
  pub ids: Vec<Id>,
}

#[derive(Debug, Deserialize)]
pub struct DefaultBody {
  pub is_default: bool,
}

#[derive(Debug, Deserialize)]
pub struct ProgressBody {
  pub progress: u32,
}

impl ProgressBody {
  fn percent(&self) -> u8 { u8::try_from(self.progress.min(100)).unwrap_or(100) }
}

fn achievement_kind<E: Entity>() -> Result<LinkKind, ApiError> {
  LinkKind::achievements_of(E::KIND).ok_or_else(|| {
    ApiError::BadRequest(format!("{} records have no achievements", E::KIND.noun()))
  })
}

async fn attach<S, E>(store: &S, kind: LinkKind, id: Id, ids: Vec<Id>) -> Result<Json<AttachReport>, ApiError>
where
  S: AcademyStore,
  E: Entity,
{
  require::<S, E>(store, id).await?;
  let report = attach_all(store, kind, id, ids)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(report))
}

async fn detach<S: AcademyStore>(
  store: &S,
  kind: LinkKind,
  left: Id,
  right: Id,
) -> Result<StatusCode, ApiError> {
  if store.unlink(kind, left, right).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    let (_, right_kind) = kind.ends();
    Err(ApiError::missing(EntityRef::new(right_kind, right)))
  }
}

// ─── Achievements ────────────────────────────────────────────────────────────

/// `GET /{programs|modules|curriculum}/{id}/achievements`
pub async fn achievements<S, E>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<Vec<LinkedAchievement>>, ApiError>
where
  S: AcademyStore,
  E: Entity,
{
  let kind = achievement_kind::<E>()?;
  require::<S, E>(&store, id).await?;
  let linked = view::achievements_for(&*store, kind, id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(linked))
}

/// `POST /{..}/{id}/achievements`: body: `{"ids":[..]}`.
pub async fn attach_achievements<S, E>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Json(body): Json<AttachBody>,
) -> Result<Json<AttachReport>, ApiError>
where
  S: AcademyStore,
  E: Entity,
{
  let kind = achievement_kind::<E>()?;
  attach::<S, E>(&store, kind, id, body.ids).await
}

/// `DELETE /{..}/{id}/achievements/{aid}`
pub async fn detach_achievement<S, E>(
  State(store): State<Arc<S>>,
  Path((id, achievement_id)): Path<(Id, Id)>,
) -> Result<StatusCode, ApiError>
where
  S: AcademyStore,
  E: Entity,
{
  let kind = achievement_kind::<E>()?;
  detach(&*store, kind, id, achievement_id).await
}

/// `PUT /{programs|modules}/{id}/achievements/{aid}/default`
pub async fn set_default<S, E>(
  State(store): State<Arc<S>>,
  Path((id, achievement_id)): Path<(Id, Id)>,
  Json(body): Json<DefaultBody>,
) -> Result<StatusCode, ApiError>
where
  S: AcademyStore,
  E: Entity,
{
  let kind = achievement_kind::<E>()?;
  let found = store
    .set_default(kind, id, achievement_id, body.is_default)
    .await
    .map_err(ApiError::store)?;
  if found {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::missing(EntityRef::new(EntityKind::Achievement, achievement_id)))
  }
}

/// `GET /students/{id}/achievements`
pub async fn earned<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<Vec<EarnedAchievement>>, ApiError> {
  require::<S, Student>(&store, id).await?;
  let earned = view::earned_by(&*store, id).await.map_err(ApiError::store)?;
  Ok(Json(earned))
}

// ─── Parents ─────────────────────────────────────────────────────────────────

/// `GET /students/{id}/parents`
pub async fn parents<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<Vec<Parent>>, ApiError> {
  require::<S, Student>(&store, id).await?;
  let parents = view::parents_of(&*store, id).await.map_err(ApiError::store)?;
  Ok(Json(parents))
}

/// `POST /students/{id}/parents`: body: `{"ids":[..]}`.
pub async fn attach_parents<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Json(body): Json<AttachBody>,
) -> Result<Json<AttachReport>, ApiError> {
  attach::<S, Student>(&store, LinkKind::StudentParent, id, body.ids).await
}

/// `DELETE /students/{id}/parents/{pid}`
pub async fn detach_parent<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path((id, parent_id)): Path<(Id, Id)>,
) -> Result<StatusCode, ApiError> {
  detach(&*store, LinkKind::StudentParent, id, parent_id).await
}

/// `GET /parents/{id}/students`
pub async fn children<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<Vec<Student>>, ApiError> {
  require::<S, Parent>(&store, id).await?;
  let students = view::students_of(&*store, id).await.map_err(ApiError::store)?;
  Ok(Json(students))
}

// ─── Enrollments ─────────────────────────────────────────────────────────────

/// `GET /students/{id}/programs`
pub async fn enrollments<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<Vec<Enrollment>>, ApiError> {
  require::<S, Student>(&store, id).await?;
  let enrollments = view::enrollments_of(&*store, id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(enrollments))
}

/// `POST /students/{id}/programs`: body: `{"ids":[..]}`.
pub async fn enroll<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Json(body): Json<AttachBody>,
) -> Result<Json<AttachReport>, ApiError> {
  attach::<S, Student>(&store, LinkKind::Enrollment, id, body.ids).await
}

/// `DELETE /students/{id}/programs/{pid}`
pub async fn unenroll<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path((id, program_id)): Path<(Id, Id)>,
) -> Result<StatusCode, ApiError> {
  detach(&*store, LinkKind::Enrollment, id, program_id).await
}

/// `PUT /students/{id}/programs/{pid}/progress`: any non-negative integer
/// is accepted and values above 100 are clamped.
pub async fn set_progress<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path((id, program_id)): Path<(Id, Id)>,
  Json(body): Json<ProgressBody>,
) -> Result<StatusCode, ApiError> {
  let found = store
    .set_progress(id, program_id, body.percent())
    .await
    .map_err(ApiError::store)?;
  if found {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("student {id} is not enrolled in program {program_id}")))
  }
}
