//! Read models: detail views assembled at read time from entities and
//! links, plus the dashboard counters.
//!
//! Every function returns `Ok(None)` when the requested record does not
//! exist. Links whose far end has vanished are skipped.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  Entity, Id,
  achievement::Achievement,
  content::{ContentKind, Renderer},
  curriculum::CurriculumItem,
  link::{Link, LinkEnd, LinkKind},
  people::{Organization, Parent, Student},
  program::{Module, Program, Status},
  store::AcademyStore,
};

// ─── Read model types ────────────────────────────────────────────────────────

/// An achievement attached to a program or module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedAchievement {
  #[serde(flatten)]
  pub achievement: Achievement,
  pub is_default:  bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramDetail {
  pub program:      Program,
  pub module_count: usize,
  pub modules:      Vec<Module>,
  pub achievements: Vec<LinkedAchievement>,
}

/// A program list row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramSummary {
  #[serde(flatten)]
  pub program:      Program,
  pub module_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleDetail {
  pub module:       Module,
  pub program:      Option<Program>,
  /// Ordered by position.
  pub curriculum:   Vec<CurriculumItem>,
  pub achievements: Vec<LinkedAchievement>,
}

/// How a curriculum item's content should be shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentView {
  pub kind:     ContentKind,
  pub label:    &'static str,
  #[serde(flatten)]
  pub renderer: Renderer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurriculumDetail {
  pub item:         CurriculumItem,
  pub module:       Option<Module>,
  pub achievements: Vec<Achievement>,
  pub content:      Option<ContentView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enrollment {
  pub program:       Program,
  pub progress:      u8,
  pub registered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarnedAchievement {
  #[serde(flatten)]
  pub achievement: Achievement,
  pub earned_at:   Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentDetail {
  pub student:      Student,
  pub organization: Option<Organization>,
  pub parents:      Vec<Parent>,
  pub enrollments:  Vec<Enrollment>,
  pub achievements: Vec<EarnedAchievement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParentDetail {
  pub parent:   Parent,
  pub students: Vec<Student>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationDetail {
  pub organization:  Organization,
  pub student_count: usize,
  pub students:      Vec<Student>,
  /// Programs any of the students is enrolled in, each once, in student
  /// then enrollment order.
  pub programs:      Vec<Program>,
}

/// An organization list row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationSummary {
  #[serde(flatten)]
  pub organization:  Organization,
  pub student_count: usize,
}

/// Everything that references an achievement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementDetail {
  pub achievement:      Achievement,
  pub programs:         Vec<Program>,
  pub modules:          Vec<Module>,
  pub curriculum_items: Vec<CurriculumItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
  pub students:        usize,
  pub organizations:   usize,
  pub parents:         usize,
  pub programs:        usize,
  pub active_programs: usize,
  pub achievements:    usize,
}

// ─── Resolution helpers ──────────────────────────────────────────────────────

/// Pair each link with its resolved record, in link order.
async fn resolve<S, E>(
  store: &S,
  links: Vec<Link>,
  id_of: impl Fn(&Link) -> Id,
) -> Result<Vec<(Link, E)>, S::Error>
where
  S: AcademyStore,
  E: Entity,
{
  let rows = store.list::<E>().await?;
  Ok(
    links
      .into_iter()
      .filter_map(|link| {
        let id = id_of(&link);
        rows.iter().find(|r| r.id() == id).cloned().map(|r| (link, r))
      })
      .collect(),
  )
}

async fn rights<S: AcademyStore, E: Entity>(
  store: &S,
  kind: LinkKind,
  left: Id,
) -> Result<Vec<(Link, E)>, S::Error> {
  let links = store.links(kind, LinkEnd::Left(left)).await?;
  resolve(store, links, |l| l.right_id).await
}

async fn lefts<S: AcademyStore, E: Entity>(
  store: &S,
  kind: LinkKind,
  right: Id,
) -> Result<Vec<E>, S::Error> {
  let links = store.links(kind, LinkEnd::Right(right)).await?;
  let pairs = resolve(store, links, |l| l.left_id).await?;
  Ok(pairs.into_iter().map(|(_, e)| e).collect())
}

async fn linked_achievements<S: AcademyStore>(
  store: &S,
  kind: LinkKind,
  left: Id,
) -> Result<Vec<LinkedAchievement>, S::Error> {
  let pairs = rights::<S, Achievement>(store, kind, left).await?;
  Ok(
    pairs
      .into_iter()
      .map(|(link, achievement)| LinkedAchievement { achievement, is_default: link.is_default })
      .collect(),
  )
}

async fn owner<S: AcademyStore, E: Entity>(
  store: &S,
  id: Option<Id>,
) -> Result<Option<E>, S::Error> {
  match id {
    Some(id) => store.get::<E>(id).await,
    None => Ok(None),
  }
}

// ─── Detail views ────────────────────────────────────────────────────────────

pub async fn program_detail<S: AcademyStore>(
  store: &S,
  id: Id,
) -> Result<Option<ProgramDetail>, S::Error> {
  let Some(program) = store.get::<Program>(id).await? else {
    return Ok(None);
  };
  let modules = store.children::<Module>(id).await?;
  Ok(Some(ProgramDetail {
    module_count: modules.len(),
    modules,
    achievements: linked_achievements(store, LinkKind::ProgramAchievement, id).await?,
    program,
  }))
}

pub async fn module_detail<S: AcademyStore>(
  store: &S,
  id: Id,
) -> Result<Option<ModuleDetail>, S::Error> {
  let Some(module) = store.get::<Module>(id).await? else {
    return Ok(None);
  };
  let mut curriculum = store.children::<CurriculumItem>(id).await?;
  curriculum.sort_by_key(|i| i.position);
  Ok(Some(ModuleDetail {
    program: store.get::<Program>(module.program_id).await?,
    curriculum,
    achievements: linked_achievements(store, LinkKind::ModuleAchievement, id).await?,
    module,
  }))
}

pub async fn curriculum_detail<S: AcademyStore>(
  store: &S,
  id: Id,
) -> Result<Option<CurriculumDetail>, S::Error> {
  let Some(item) = store.get::<CurriculumItem>(id).await? else {
    return Ok(None);
  };
  let achievements = rights::<S, Achievement>(store, LinkKind::CurriculumAchievement, id)
    .await?
    .into_iter()
    .map(|(_, a)| a)
    .collect();
  let content = item.content.as_ref().map(|content| {
    let kind = content.kind();
    ContentView { kind, label: kind.label(), renderer: kind.renderer(&content.url) }
  });
  Ok(Some(CurriculumDetail {
    module: store.get::<Module>(item.module_id).await?,
    achievements,
    content,
    item,
  }))
}

pub async fn student_detail<S: AcademyStore>(
  store: &S,
  id: Id,
) -> Result<Option<StudentDetail>, S::Error> {
  let Some(student) = store.get::<Student>(id).await? else {
    return Ok(None);
  };
  Ok(Some(StudentDetail {
    organization: owner::<S, Organization>(store, student.organization_id).await?,
    parents: parents_of(store, id).await?,
    enrollments: enrollments_of(store, id).await?,
    achievements: earned_by(store, id).await?,
    student,
  }))
}

pub async fn parent_detail<S: AcademyStore>(
  store: &S,
  id: Id,
) -> Result<Option<ParentDetail>, S::Error> {
  let Some(parent) = store.get::<Parent>(id).await? else {
    return Ok(None);
  };
  Ok(Some(ParentDetail {
    students: lefts(store, LinkKind::StudentParent, id).await?,
    parent,
  }))
}

pub async fn organization_detail<S: AcademyStore>(
  store: &S,
  id: Id,
) -> Result<Option<OrganizationDetail>, S::Error> {
  let Some(organization) = store.get::<Organization>(id).await? else {
    return Ok(None);
  };
  let students = store.children::<Student>(id).await?;
  let mut programs: Vec<Program> = Vec::new();
  for student in &students {
    for (_, program) in rights::<S, Program>(store, LinkKind::Enrollment, student.id).await? {
      if !programs.iter().any(|p| p.id == program.id) {
        programs.push(program);
      }
    }
  }
  Ok(Some(OrganizationDetail {
    student_count: students.len(),
    students,
    programs,
    organization,
  }))
}

pub async fn achievement_detail<S: AcademyStore>(
  store: &S,
  id: Id,
) -> Result<Option<AchievementDetail>, S::Error> {
  let Some(achievement) = store.get::<Achievement>(id).await? else {
    return Ok(None);
  };
  Ok(Some(AchievementDetail {
    programs: lefts(store, LinkKind::ProgramAchievement, id).await?,
    modules: lefts(store, LinkKind::ModuleAchievement, id).await?,
    curriculum_items: lefts(store, LinkKind::CurriculumAchievement, id).await?,
    achievement,
  }))
}

/// Achievements linked to `left` through `kind`, resolved, in link order.
pub async fn achievements_for<S: AcademyStore>(
  store: &S,
  kind: LinkKind,
  left: Id,
) -> Result<Vec<LinkedAchievement>, S::Error> {
  linked_achievements(store, kind, left).await
}

/// Parents linked to a student.
pub async fn parents_of<S: AcademyStore>(store: &S, student_id: Id) -> Result<Vec<Parent>, S::Error> {
  Ok(
    rights::<S, Parent>(store, LinkKind::StudentParent, student_id)
      .await?
      .into_iter()
      .map(|(_, p)| p)
      .collect(),
  )
}

pub async fn enrollments_of<S: AcademyStore>(
  store: &S,
  student_id: Id,
) -> Result<Vec<Enrollment>, S::Error> {
  Ok(
    rights::<S, Program>(store, LinkKind::Enrollment, student_id)
      .await?
      .into_iter()
      .map(|(link, program)| Enrollment {
        program,
        progress: link.progress,
        registered_at: link.linked_at,
      })
      .collect(),
  )
}

pub async fn earned_by<S: AcademyStore>(
  store: &S,
  student_id: Id,
) -> Result<Vec<EarnedAchievement>, S::Error> {
  Ok(
    rights::<S, Achievement>(store, LinkKind::StudentAchievement, student_id)
      .await?
      .into_iter()
      .map(|(link, achievement)| EarnedAchievement { achievement, earned_at: link.linked_at })
      .collect(),
  )
}

/// Students linked to a parent.
pub async fn students_of<S: AcademyStore>(store: &S, parent_id: Id) -> Result<Vec<Student>, S::Error> {
  lefts(store, LinkKind::StudentParent, parent_id).await
}

// ─── List summaries ──────────────────────────────────────────────────────────

/// Pair each program with its module count, keeping the given order.
pub async fn program_summaries<S: AcademyStore>(
  store: &S,
  programs: Vec<Program>,
) -> Result<Vec<ProgramSummary>, S::Error> {
  let modules = store.list::<Module>().await?;
  Ok(
    programs
      .into_iter()
      .map(|program| ProgramSummary {
        module_count: modules.iter().filter(|m| m.program_id == program.id).count(),
        program,
      })
      .collect(),
  )
}

/// Pair each organization with its student count, keeping the given order.
pub async fn organization_summaries<S: AcademyStore>(
  store: &S,
  organizations: Vec<Organization>,
) -> Result<Vec<OrganizationSummary>, S::Error> {
  let students = store.list::<Student>().await?;
  Ok(
    organizations
      .into_iter()
      .map(|organization| OrganizationSummary {
        student_count: students
          .iter()
          .filter(|s| s.organization_id == Some(organization.id))
          .count(),
        organization,
      })
      .collect(),
  )
}

pub async fn dashboard<S: AcademyStore>(store: &S) -> Result<DashboardStats, S::Error> {
  let programs = store.list::<Program>().await?;
  Ok(DashboardStats {
    students:        store.list::<Student>().await?.len(),
    organizations:   store.list::<Organization>().await?.len(),
    parents:         store.list::<Parent>().await?.len(),
    active_programs: programs.iter().filter(|p| p.status == Status::Active).count(),
    programs:        programs.len(),
    achievements:    store.list::<Achievement>().await?.len(),
  })
}
