//! `Dataset`: a complete, ordered snapshot of every entity kind and link.
//!
//! Besides serving as the fixture and restore format, a dataset knows how to
//! apply every repository mutation to itself, so the in-memory backend is a
//! dataset behind a lock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  Entity, EntityKind, EntityRef, Error, Id, Result,
  achievement::Achievement,
  curriculum::{CurriculumItem, Direction},
  entity::{OnDelete, next_id},
  link::{Link, LinkEnd, LinkKind, NewLink},
  people::{Organization, Parent, Student},
  program::{Module, Program},
  store::{DeleteOutcome, DeletePolicy, check_default_kind},
  validate::Validate,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
  pub students:         Vec<Student>,
  pub parents:          Vec<Parent>,
  pub organizations:    Vec<Organization>,
  pub programs:         Vec<Program>,
  pub modules:          Vec<Module>,
  pub curriculum_items: Vec<CurriculumItem>,
  pub achievements:     Vec<Achievement>,
  pub links:            Vec<Link>,
}

/// `(id, owner_id)` for each row.
type Keys = Vec<(Id, Option<Id>)>;

impl Dataset {
  pub fn is_empty(&self) -> bool { *self == Self::default() }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub fn get<E: Entity>(&self, id: Id) -> Option<&E> {
    E::rows(self).iter().find(|r| r.id() == id)
  }

  pub fn children<E: Entity>(&self, owner_id: Id) -> Vec<E> {
    E::rows(self)
      .iter()
      .filter(|r| r.owner_id() == Some(owner_id))
      .cloned()
      .collect()
  }

  pub fn contains(&self, target: EntityRef) -> bool {
    self.keys(target.kind).iter().any(|(id, _)| *id == target.id)
  }

  pub fn links(&self, kind: LinkKind, end: LinkEnd) -> Vec<Link> {
    self
      .links
      .iter()
      .filter(|l| l.kind == kind && end.matches(l))
      .cloned()
      .collect()
  }

  fn keys(&self, kind: EntityKind) -> Keys {
    fn keys<E: Entity>(rows: &[E]) -> Keys {
      rows.iter().map(|r| (r.id(), r.owner_id())).collect()
    }
    match kind {
      EntityKind::Student => keys(&self.students),
      EntityKind::Parent => keys(&self.parents),
      EntityKind::Organization => keys(&self.organizations),
      EntityKind::Program => keys(&self.programs),
      EntityKind::Module => keys(&self.modules),
      EntityKind::CurriculumItem => keys(&self.curriculum_items),
      EntityKind::Achievement => keys(&self.achievements),
    }
  }

  /// Records directly owned by `target`, with the rule applied to each on a
  /// cascading delete.
  pub fn dependents(&self, target: EntityRef) -> Vec<(EntityRef, OnDelete)> {
    target
      .kind
      .children()
      .flat_map(|(kind, rule)| {
        self
          .keys(kind)
          .into_iter()
          .filter(|(_, owner)| *owner == Some(target.id))
          .map(move |(id, _)| (EntityRef::new(kind, id), rule.on_delete))
      })
      .collect()
  }

  // ── Entity writes ─────────────────────────────────────────────────────

  /// Reject a row whose owner is missing, then let it settle against its
  /// siblings. Returns the siblings that must be rewritten.
  fn place<E: Entity>(&self, row: &mut E, previous: Option<&E>) -> Result<Vec<E>> {
    if let (Some(ownership), Some(owner_id)) = (E::KIND.ownership(), row.owner_id()) {
      let owner = EntityRef::new(ownership.parent, owner_id);
      if !self.contains(owner) {
        return Err(Error::DanglingReference(owner));
      }
    }
    let siblings: Vec<E> = E::rows(self)
      .iter()
      .filter(|s| s.id() != row.id() && s.owner_id() == row.owner_id())
      .cloned()
      .collect();
    row.arrange(previous, &siblings)
  }

  fn rewrite<E: Entity>(&mut self, rows: Vec<E>) {
    let stored = E::rows_mut(self);
    for row in rows {
      if let Some(slot) = stored.iter_mut().find(|r| r.id() == row.id()) {
        *slot = row;
      }
    }
  }

  pub fn insert<E: Entity>(&mut self, draft: E::Draft) -> Result<E> {
    draft.validate()?;
    let id = next_id(E::rows(self).iter().map(Entity::id));
    let mut row = E::build(id, draft);
    self.place(&mut row, None)?;
    E::rows_mut(self).push(row.clone());
    debug!(entity = %row.entity_ref(), "inserted");
    Ok(row)
  }

  pub fn update<E: Entity>(&mut self, id: Id, draft: E::Draft) -> Result<Option<E>> {
    let Some(index) = E::rows(self).iter().position(|r| r.id() == id) else {
      return Ok(None);
    };
    draft.validate()?;
    let previous = E::rows(self)[index].clone();
    let mut row = E::build(id, draft);
    let shifted = self.place(&mut row, Some(&previous))?;
    E::rows_mut(self)[index] = row.clone();
    self.rewrite(shifted);
    if E::KIND == EntityKind::CurriculumItem && previous.owner_id() != row.owner_id() {
      if let Some(module_id) = previous.owner_id() {
        self.compact_positions(module_id);
      }
    }
    debug!(entity = %row.entity_ref(), "updated");
    Ok(Some(row))
  }

  pub fn remove(&mut self, target: EntityRef, policy: DeletePolicy) -> DeleteOutcome {
    if !self.contains(target) {
      return DeleteOutcome::NotFound;
    }

    let direct = self.dependents(target);
    if !direct.is_empty() && policy == DeletePolicy::Restrict {
      return DeleteOutcome::blocked(target, direct.into_iter().map(|(r, _)| r).collect());
    }

    // `removed` doubles as the work queue of the cascade.
    let mut removed = vec![target];
    let mut detached = Vec::new();
    let mut next = 0;
    while let Some(&current) = removed.get(next) {
      for (child, rule) in self.dependents(current) {
        match rule {
          OnDelete::Remove => removed.push(child),
          OnDelete::Detach => detached.push(child),
        }
      }
      next += 1;
    }

    let compact = match target.kind {
      EntityKind::CurriculumItem => self.get::<CurriculumItem>(target.id).map(|i| i.module_id),
      _ => None,
    };

    for r in &detached {
      self.detach_row(*r);
    }
    for r in &removed {
      self.delete_row(*r);
    }
    self.links.retain(|l| !removed.iter().any(|r| l.touches(*r)));
    if let Some(module_id) = compact {
      self.compact_positions(module_id);
    }

    let affected: Vec<EntityRef> = removed.into_iter().skip(1).chain(detached).collect();
    debug!(entity = %target, affected = affected.len(), "removed");
    if affected.is_empty() {
      DeleteOutcome::Deleted
    } else {
      DeleteOutcome::CascadedDeleted { affected }
    }
  }

  fn delete_row(&mut self, target: EntityRef) {
    fn delete<E: Entity>(rows: &mut Vec<E>, id: Id) { rows.retain(|r| r.id() != id); }
    match target.kind {
      EntityKind::Student => delete(&mut self.students, target.id),
      EntityKind::Parent => delete(&mut self.parents, target.id),
      EntityKind::Organization => delete(&mut self.organizations, target.id),
      EntityKind::Program => delete(&mut self.programs, target.id),
      EntityKind::Module => delete(&mut self.modules, target.id),
      EntityKind::CurriculumItem => delete(&mut self.curriculum_items, target.id),
      EntityKind::Achievement => delete(&mut self.achievements, target.id),
    }
  }

  fn detach_row(&mut self, target: EntityRef) {
    fn detach<E: Entity>(rows: &mut [E], id: Id) {
      rows.iter_mut().filter(|r| r.id() == id).for_each(Entity::detach);
    }
    match target.kind {
      EntityKind::Student => detach(&mut self.students, target.id),
      EntityKind::Parent => detach(&mut self.parents, target.id),
      EntityKind::Organization => detach(&mut self.organizations, target.id),
      EntityKind::Program => detach(&mut self.programs, target.id),
      EntityKind::Module => detach(&mut self.modules, target.id),
      EntityKind::CurriculumItem => detach(&mut self.curriculum_items, target.id),
      EntityKind::Achievement => detach(&mut self.achievements, target.id),
    }
  }

  // ── Curriculum ordering ───────────────────────────────────────────────

  /// Renumber a module's items 1..=n in their current order.
  fn compact_positions(&mut self, module_id: Id) {
    let mut items: Vec<&mut CurriculumItem> = self
      .curriculum_items
      .iter_mut()
      .filter(|i| i.module_id == module_id)
      .collect();
    items.sort_by_key(|i| i.position);
    for (n, item) in (1..).zip(items) {
      item.position = n;
    }
  }

  pub fn move_item(&mut self, item_id: Id, direction: Direction) -> bool {
    let Some(index) = self.curriculum_items.iter().position(|i| i.id == item_id) else {
      return false;
    };
    let (module_id, position) = {
      let item = &self.curriculum_items[index];
      (item.module_id, item.position)
    };
    let neighbor = self
      .curriculum_items
      .iter()
      .enumerate()
      .filter(|(_, i)| i.module_id == module_id)
      .filter(|(_, i)| match direction {
        Direction::Up => i.position < position,
        Direction::Down => i.position > position,
      })
      .min_by_key(|(_, i)| i.position.abs_diff(position))
      .map(|(n, i)| (n, i.position));
    let Some((other, other_position)) = neighbor else {
      return false;
    };
    self.curriculum_items[index].position = other_position;
    self.curriculum_items[other].position = position;
    true
  }

  // ── Link writes ───────────────────────────────────────────────────────

  pub fn link(&mut self, new: NewLink, now: DateTime<Utc>) -> Result<Option<Link>> {
    let (left, right) = new.kind.ends();
    for end in [EntityRef::new(left, new.left_id), EntityRef::new(right, new.right_id)] {
      if !self.contains(end) {
        return Err(Error::DanglingReference(end));
      }
    }
    if self.find_link(new.kind, new.left_id, new.right_id).is_some() {
      return Ok(None);
    }
    let link = new.into_link(now);
    self.links.push(link.clone());
    Ok(Some(link))
  }

  fn find_link(&self, kind: LinkKind, left: Id, right: Id) -> Option<usize> {
    self.links.iter().position(|l| l.pair() == (kind, left, right))
  }

  pub fn unlink(&mut self, kind: LinkKind, left: Id, right: Id) -> bool {
    match self.find_link(kind, left, right) {
      Some(index) => {
        self.links.remove(index);
        true
      }
      None => false,
    }
  }

  pub fn set_default(
    &mut self,
    kind: LinkKind,
    left: Id,
    right: Id,
    is_default: bool,
  ) -> Result<bool> {
    check_default_kind(kind)?;
    Ok(match self.find_link(kind, left, right) {
      Some(index) => {
        self.links[index].is_default = is_default;
        true
      }
      None => false,
    })
  }

  pub fn set_progress(&mut self, student_id: Id, program_id: Id, progress: u8) -> bool {
    match self.find_link(LinkKind::Enrollment, student_id, program_id) {
      Some(index) => {
        self.links[index].progress = progress.min(100);
        true
      }
      None => false,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    curriculum::{ContentRef, CurriculumItemDraft},
    people::StudentDraft,
    program::ModuleDraft,
  };

  fn data() -> Dataset { Dataset::fixtures() }

  fn positions(data: &Dataset, module_id: Id) -> Vec<(Id, u32)> {
    let mut items: Vec<_> = data
      .children::<CurriculumItem>(module_id)
      .into_iter()
      .map(|i| (i.id, i.position))
      .collect();
    items.sort_by_key(|(_, p)| *p);
    items
  }

  #[test]
  fn insert_assigns_one_past_max() {
    let mut data = data();
    let before = data.students.iter().map(|s| s.id).max().unwrap();
    let student: Student = data
      .insert(StudentDraft {
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        ..Default::default()
      })
      .unwrap();
    assert_eq!(student.id, before + 1);
    assert_eq!(data.students.last(), Some(&student));
  }

  #[test]
  fn insert_rejects_dangling_owner() {
    let mut data = data();
    let err = data
      .insert::<Module>(ModuleDraft {
        program_id: 99,
        name: "Orphan".into(),
        ..Default::default()
      })
      .unwrap_err();
    assert!(matches!(
      err,
      Error::DanglingReference(EntityRef { kind: EntityKind::Program, id: 99 })
    ));
  }

  #[test]
  fn insert_rejects_taken_position() {
    let mut data = data();
    let err = data
      .insert::<CurriculumItem>(CurriculumItemDraft {
        module_id: 1,
        title: "Duplicate".into(),
        position: Some(2),
        content: Some(ContentRef::link("/x.pdf")),
        ..Default::default()
      })
      .unwrap_err();
    assert!(matches!(err, Error::PositionTaken { module_id: 1, position: 2 }));
  }

  fn item_draft(module_id: Id, position: Option<u32>) -> CurriculumItemDraft {
    CurriculumItemDraft {
      module_id,
      title: "Accessibility Basics".into(),
      position,
      content: Some(ContentRef::link("/curriculum/a11y.pdf")),
      ..Default::default()
    }
  }

  #[test]
  fn insert_without_position_appends() {
    let mut data = data();
    let item: CurriculumItem = data.insert(item_draft(2, None)).unwrap();
    assert_eq!(item.position, 3);
  }

  #[test]
  fn insert_past_the_end_is_rejected() {
    let mut data = data();
    let before = data.clone();
    let err = data.insert::<CurriculumItem>(item_draft(1, Some(10))).unwrap_err();
    assert!(matches!(
      err,
      Error::PositionOutOfRange { module_id: 1, position: 10, max: 6 }
    ));
    assert_eq!(data, before);
  }

  #[test]
  fn reposition_within_module_stays_dense() {
    let mut data = data();
    let mut draft = data.get::<CurriculumItem>(2).unwrap().to_draft();
    draft.position = Some(4);
    data.update::<CurriculumItem>(2, draft.clone()).unwrap();
    assert_eq!(positions(&data, 1), vec![(1, 1), (3, 2), (4, 3), (2, 4), (5, 5)]);

    draft.position = Some(42);
    let before = data.clone();
    assert!(matches!(
      data.update::<CurriculumItem>(2, draft),
      Err(Error::PositionOutOfRange { max: 5, .. })
    ));
    assert_eq!(data, before);
  }

  #[test]
  fn moving_to_another_module_compacts_the_old_one() {
    let mut data = data();
    let mut draft = data.get::<CurriculumItem>(2).unwrap().to_draft();
    draft.module_id = 2;
    draft.position = None;
    let item = data.update::<CurriculumItem>(2, draft).unwrap().unwrap();
    assert_eq!(item.position, 3);
    assert_eq!(positions(&data, 1), vec![(1, 1), (3, 2), (4, 3), (5, 4)]);
    assert_eq!(positions(&data, 2), vec![(6, 1), (7, 2), (2, 3)]);
  }

  #[test]
  fn invalid_draft_leaves_data_untouched() {
    let mut data = data();
    let before = data.clone();
    assert!(matches!(
      data.insert::<Student>(StudentDraft::default()),
      Err(Error::Validation(_))
    ));
    assert_eq!(data, before);
  }

  #[test]
  fn update_of_missing_row_is_none() {
    let mut data = data();
    let draft = data.students[0].to_draft();
    assert_eq!(data.update::<Student>(404, draft).unwrap(), None);
  }

  #[test]
  fn update_keeps_id_and_position_in_store() {
    let mut data = data();
    let mut draft = data.get::<Program>(2).unwrap().to_draft();
    draft.name = "Mobile Apps".into();
    let program = data.update::<Program>(2, draft).unwrap().unwrap();
    assert_eq!(program.id, 2);
    assert_eq!(data.programs[1].name, "Mobile Apps");
  }

  #[test]
  fn restrict_blocks_on_owned_records() {
    let mut data = data();
    let before = data.clone();
    let outcome = data.remove(EntityRef::new(EntityKind::Program, 1), DeletePolicy::Restrict);
    let DeleteOutcome::Blocked { dependents, .. } = outcome else {
      panic!("expected blocked, got {outcome:?}");
    };
    assert_eq!(dependents.len(), 3);
    assert_eq!(data, before);
  }

  #[test]
  fn cascade_removes_the_whole_subtree() {
    let mut data = data();
    let outcome = data.remove(EntityRef::new(EntityKind::Program, 1), DeletePolicy::Cascade);
    let DeleteOutcome::CascadedDeleted { affected } = outcome else {
      panic!("expected cascade, got {outcome:?}");
    };
    // three modules plus the seven curriculum items of modules 1 and 2
    assert_eq!(affected.len(), 10);
    assert!(data.modules.iter().all(|m| m.program_id != 1));
    assert!(data.curriculum_items.iter().all(|i| i.module_id > 3));
    for r in affected {
      assert!(data.links.iter().all(|l| !l.touches(r)));
    }
    assert!(data.links(LinkKind::ProgramAchievement, LinkEnd::Left(1)).is_empty());
    assert!(data.links(LinkKind::Enrollment, LinkEnd::Right(1)).is_empty());
  }

  #[test]
  fn organization_cascade_detaches_students() {
    let mut data = data();
    let outcome =
      data.remove(EntityRef::new(EntityKind::Organization, 1), DeletePolicy::Cascade);
    let DeleteOutcome::CascadedDeleted { affected } = outcome else {
      panic!("expected cascade, got {outcome:?}");
    };
    assert!(affected.iter().all(|r| r.kind == EntityKind::Student));
    assert_eq!(affected.len(), 3);
    assert_eq!(data.students.len(), 7);
    assert!(data.students.iter().all(|s| s.organization_id != Some(1)));
  }

  #[test]
  fn leaf_delete_purges_links() {
    let mut data = data();
    let outcome = data.remove(EntityRef::new(EntityKind::Achievement, 8), DeletePolicy::Restrict);
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert!(
      data
        .links
        .iter()
        .all(|l| !l.touches(EntityRef::new(EntityKind::Achievement, 8)))
    );
  }

  #[test]
  fn missing_delete_is_not_found() {
    let mut data = data();
    assert_eq!(
      data.remove(EntityRef::new(EntityKind::Parent, 99), DeletePolicy::Cascade),
      DeleteOutcome::NotFound
    );
  }

  #[test]
  fn curriculum_delete_keeps_positions_dense() {
    let mut data = data();
    data.remove(EntityRef::new(EntityKind::CurriculumItem, 2), DeletePolicy::Restrict);
    assert_eq!(positions(&data, 1), vec![(1, 1), (3, 2), (4, 3), (5, 4)]);
  }

  #[test]
  fn move_swaps_exactly_two_positions() {
    let mut data = data();
    let before = positions(&data, 1);
    assert!(data.move_item(3, Direction::Up));
    let after = positions(&data, 1);
    assert_eq!(after, vec![(1, 1), (3, 2), (2, 3), (4, 4), (5, 5)]);
    let changed = before.iter().filter(|b| !after.contains(b)).count();
    assert_eq!(changed, 2);

    assert!(data.move_item(3, Direction::Down));
    assert_eq!(positions(&data, 1), before);
  }

  #[test]
  fn move_past_either_end_is_refused() {
    let mut data = data();
    assert!(!data.move_item(1, Direction::Up));
    assert!(!data.move_item(5, Direction::Down));
    assert!(!data.move_item(404, Direction::Down));
  }

  #[test]
  fn duplicate_link_is_skipped() {
    let mut data = data();
    let now = Utc::now();
    let link = NewLink::new(LinkKind::StudentParent, 1, 1);
    assert_eq!(data.link(link.clone(), now).unwrap(), None);

    let link = NewLink::new(LinkKind::StudentParent, 2, 3);
    assert!(data.link(link.clone(), now).unwrap().is_some());
    assert_eq!(data.link(link, now).unwrap(), None);
  }

  #[test]
  fn link_to_missing_entity_is_rejected() {
    let mut data = data();
    let err = data
      .link(NewLink::new(LinkKind::ModuleAchievement, 1, 99), Utc::now())
      .unwrap_err();
    assert!(matches!(
      err,
      Error::DanglingReference(EntityRef { kind: EntityKind::Achievement, id: 99 })
    ));
  }

  #[test]
  fn default_flag_only_on_achievement_links() {
    let mut data = data();
    assert!(data.set_default(LinkKind::ProgramAchievement, 1, 2, true).unwrap());
    assert!(!data.set_default(LinkKind::ProgramAchievement, 1, 9, true).unwrap());
    assert!(data.set_default(LinkKind::StudentParent, 1, 1, true).is_err());
  }

  #[test]
  fn progress_is_clamped() {
    let mut data = data();
    assert!(data.set_progress(1, 1, 140));
    assert_eq!(data.links(LinkKind::Enrollment, LinkEnd::Left(1))[0].progress, 100);
    assert!(!data.set_progress(1, 2, 10));
  }
}
