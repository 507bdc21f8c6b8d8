//! Join records between entities.
//!
//! A [`Link`] carries only the two keys and its own metadata. Names, types
//! and descriptions of the linked records are resolved at read time (see
//! [`crate::view`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::{
  EntityKind, EntityRef, Id,
  store::AcademyStore,
};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LinkKind {
  ProgramAchievement,
  ModuleAchievement,
  CurriculumAchievement,
  StudentParent,
  Enrollment,
  StudentAchievement,
}

impl LinkKind {
  /// The entity kinds on the left and right of this link.
  pub fn ends(self) -> (EntityKind, EntityKind) {
    use EntityKind::*;
    match self {
      Self::ProgramAchievement => (Program, Achievement),
      Self::ModuleAchievement => (Module, Achievement),
      Self::CurriculumAchievement => (CurriculumItem, Achievement),
      Self::StudentParent => (Student, Parent),
      Self::Enrollment => (Student, Program),
      Self::StudentAchievement => (Student, Achievement),
    }
  }

  /// Whether links of this kind carry an "auto-granted on completion" flag.
  pub fn has_default(self) -> bool {
    matches!(self, Self::ProgramAchievement | Self::ModuleAchievement)
  }

  /// Whether links of this kind record when they were made.
  pub fn is_timestamped(self) -> bool {
    matches!(self, Self::Enrollment | Self::StudentAchievement)
  }

  /// The achievement link kind for an owning entity kind.
  pub fn achievements_of(kind: EntityKind) -> Option<Self> {
    match kind {
      EntityKind::Program => Some(Self::ProgramAchievement),
      EntityKind::Module => Some(Self::ModuleAchievement),
      EntityKind::CurriculumItem => Some(Self::CurriculumAchievement),
      EntityKind::Student => Some(Self::StudentAchievement),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
  pub kind:       LinkKind,
  pub left_id:    Id,
  pub right_id:   Id,
  pub is_default: bool,
  /// Percent complete; enrollments only.
  pub progress:   u8,
  /// Registration or earned-at time; timestamped kinds only.
  pub linked_at:  Option<DateTime<Utc>>,
}

impl Link {
  pub fn left(&self) -> EntityRef { EntityRef::new(self.kind.ends().0, self.left_id) }

  pub fn right(&self) -> EntityRef { EntityRef::new(self.kind.ends().1, self.right_id) }

  pub fn touches(&self, target: EntityRef) -> bool {
    self.left() == target || self.right() == target
  }

  pub fn pair(&self) -> (LinkKind, Id, Id) { (self.kind, self.left_id, self.right_id) }
}

/// Input to [`AcademyStore::link`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLink {
  pub kind:       LinkKind,
  pub left_id:    Id,
  pub right_id:   Id,
  #[serde(default)]
  pub is_default: bool,
  #[serde(default)]
  pub progress:   u8,
  #[serde(default)]
  pub linked_at:  Option<DateTime<Utc>>,
}

impl NewLink {
  pub fn new(kind: LinkKind, left_id: Id, right_id: Id) -> Self {
    Self {
      kind,
      left_id,
      right_id,
      is_default: false,
      progress: 0,
      linked_at: None,
    }
  }

  pub fn with_default(mut self, is_default: bool) -> Self {
    self.is_default = is_default;
    self
  }

  pub fn with_progress(mut self, progress: u8) -> Self {
    self.progress = progress;
    self
  }

  pub fn linked_at(mut self, at: DateTime<Utc>) -> Self {
    self.linked_at = Some(at);
    self
  }

  /// Normalise metadata for the link kind: flags and progress the kind does
  /// not carry are cleared, progress is clamped to 100, and timestamped
  /// kinds default to `now`.
  pub fn into_link(self, now: DateTime<Utc>) -> Link {
    let kind = self.kind;
    Link {
      kind,
      left_id: self.left_id,
      right_id: self.right_id,
      is_default: kind.has_default() && self.is_default,
      progress: if kind == LinkKind::Enrollment { self.progress.min(100) } else { 0 },
      linked_at: kind.is_timestamped().then(|| self.linked_at.unwrap_or(now)),
    }
  }
}

/// Which links of a kind to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEnd {
  Left(Id),
  Right(Id),
  All,
}

impl LinkEnd {
  pub fn matches(self, link: &Link) -> bool {
    match self {
      Self::Left(id) => link.left_id == id,
      Self::Right(id) => link.right_id == id,
      Self::All => true,
    }
  }
}

// ─── Batch attach ────────────────────────────────────────────────────────────

/// Result of attaching several records to one owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttachReport {
  pub attached: Vec<Id>,
  /// Ids that were already linked and left untouched.
  pub skipped:  Vec<Id>,
}

/// Link each of `rights` to `left`. Each link is written on its own; a
/// failure part-way leaves the earlier links in place.
pub async fn attach_all<S: AcademyStore>(
  store: &S,
  kind: LinkKind,
  left: Id,
  rights: impl IntoIterator<Item = Id>,
) -> Result<AttachReport, S::Error> {
  let mut report = AttachReport::default();
  for right in rights {
    match store.link(NewLink::new(kind, left, right)).await? {
      Some(_) => report.attached.push(right),
      None => report.skipped.push(right),
    }
  }
  Ok(report)
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn metadata_is_normalised_per_kind() {
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    let link = NewLink::new(LinkKind::StudentParent, 1, 2)
      .with_default(true)
      .with_progress(40)
      .into_link(now);
    assert!(!link.is_default);
    assert_eq!(link.progress, 0);
    assert_eq!(link.linked_at, None);

    let link = NewLink::new(LinkKind::Enrollment, 1, 2)
      .with_progress(250)
      .into_link(now);
    assert_eq!(link.progress, 100);
    assert_eq!(link.linked_at, Some(now));

    let link = NewLink::new(LinkKind::ModuleAchievement, 1, 8)
      .with_default(true)
      .into_link(now);
    assert!(link.is_default);
  }

  #[test]
  fn ends_resolve_to_entity_refs() {
    let link = NewLink::new(LinkKind::CurriculumAchievement, 3, 8).into_link(Utc::now());
    assert_eq!(link.left(), EntityRef::new(EntityKind::CurriculumItem, 3));
    assert_eq!(link.right(), EntityRef::new(EntityKind::Achievement, 8));
    assert!(link.touches(EntityRef::new(EntityKind::Achievement, 8)));
    assert!(!link.touches(EntityRef::new(EntityKind::Achievement, 3)));
  }

  #[test]
  fn link_end_filters() {
    let link = NewLink::new(LinkKind::Enrollment, 1, 3).into_link(Utc::now());
    assert!(LinkEnd::Left(1).matches(&link));
    assert!(LinkEnd::Right(3).matches(&link));
    assert!(!LinkEnd::Right(1).matches(&link));
    assert!(LinkEnd::All.matches(&link));
  }
}
