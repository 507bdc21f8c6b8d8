//! `GET /{collection}/{id}`: detail read models, plus the list rows that
//! carry counts.

use std::sync::Arc;

use academy_core::{
  Entity, EntityRef, Id,
  achievement::Achievement,
  curriculum::CurriculumItem,
  people::{Organization, Parent, Student},
  program::{Module, Program},
  query::ListQuery,
  store::AcademyStore,
  view::{
    self, AchievementDetail, CurriculumDetail, DashboardStats, ModuleDetail,
    OrganizationDetail, OrganizationSummary, ParentDetail, ProgramDetail, ProgramSummary,
    StudentDetail,
  },
};
use axum::{
  Json,
  extract::{Path, Query, State},
};

use crate::{entities::ListParams, error::ApiError};

fn found<E: Entity, T>(id: Id, detail: Option<T>) -> Result<Json<T>, ApiError> {
  detail
    .map(Json)
    .ok_or_else(|| ApiError::missing(EntityRef::new(E::KIND, id)))
}

pub async fn program<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<ProgramDetail>, ApiError> {
  let detail = view::program_detail(&*store, id).await.map_err(ApiError::store)?;
  found::<Program, _>(id, detail)
}

pub async fn module<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<ModuleDetail>, ApiError> {
  let detail = view::module_detail(&*store, id).await.map_err(ApiError::store)?;
  found::<Module, _>(id, detail)
}

pub async fn curriculum<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<CurriculumDetail>, ApiError> {
  let detail = view::curriculum_detail(&*store, id).await.map_err(ApiError::store)?;
  found::<CurriculumItem, _>(id, detail)
}

pub async fn student<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<StudentDetail>, ApiError> {
  let detail = view::student_detail(&*store, id).await.map_err(ApiError::store)?;
  found::<Student, _>(id, detail)
}

pub async fn parent<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<ParentDetail>, ApiError> {
  let detail = view::parent_detail(&*store, id).await.map_err(ApiError::store)?;
  found::<Parent, _>(id, detail)
}

pub async fn organization<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<OrganizationDetail>, ApiError> {
  let detail = view::organization_detail(&*store, id).await.map_err(ApiError::store)?;
  found::<Organization, _>(id, detail)
}

pub async fn achievement<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<AchievementDetail>, ApiError> {
  let detail = view::achievement_detail(&*store, id).await.map_err(ApiError::store)?;
  found::<Achievement, _>(id, detail)
}

// ─── List summaries ──────────────────────────────────────────────────────────

/// `GET /programs/summaries`: the program list with module counts. Takes
/// the same query parameters as `GET /programs`.
pub async fn program_summaries<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ProgramSummary>>, ApiError> {
  let rows = store.list::<Program>().await.map_err(ApiError::store)?;
  let rows = ListQuery::from(params).apply(rows);
  let summaries = view::program_summaries(&*store, rows).await.map_err(ApiError::store)?;
  Ok(Json(summaries))
}

/// `GET /organizations/summaries`: the organization list with student
/// counts.
pub async fn organization_summaries<S: AcademyStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<OrganizationSummary>>, ApiError> {
  let rows = store.list::<Organization>().await.map_err(ApiError::store)?;
  let rows = ListQuery::from(params).apply(rows);
  let summaries = view::organization_summaries(&*store, rows)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(summaries))
}

/// `GET /dashboard`
pub async fn dashboard<S: AcademyStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<DashboardStats>, ApiError> {
  let stats = view::dashboard(&*store).await.map_err(ApiError::store)?;
  Ok(Json(stats))
}
