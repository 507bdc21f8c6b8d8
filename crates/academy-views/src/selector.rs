//! Picking related records to attach.

use std::collections::BTreeSet;

use academy_core::{
  Entity, EntityKind, Id,
  link::{AttachReport, LinkKind, attach_all},
  query::ListQuery,
  store::AcademyStore,
};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq)]
pub enum AttachError<E> {
  /// The link kind does not take this selector's records on its right end.
  #[error("{kind} links {expected} records, not {found}")]
  WrongKind { kind: LinkKind, expected: EntityKind, found: EntityKind },

  #[error(transparent)]
  Store(E),
}

/// A searchable multi-select over candidate records.
#[derive(Debug, Clone)]
pub struct Selector<T: Entity> {
  candidates: Vec<T>,
  pub search: String,
  selected:   BTreeSet<Id>,
}

impl<T: Entity> Selector<T> {
  pub fn new(candidates: Vec<T>) -> Self {
    Self { candidates, search: String::new(), selected: BTreeSet::new() }
  }

  /// Every record of `T` except those whose ids are in `linked`.
  pub async fn load<S: AcademyStore>(store: &S, linked: &[Id]) -> Result<Self, S::Error> {
    let candidates = store
      .list::<T>()
      .await?
      .into_iter()
      .filter(|c| !linked.contains(&c.id()))
      .collect();
    Ok(Self::new(candidates))
  }

  /// Candidates matching the search text.
  pub fn visible(&self) -> Vec<&T> {
    let query = ListQuery::text(self.search.as_str());
    self.candidates.iter().filter(|c| query.matches(*c)).collect()
  }

  pub fn toggle(&mut self, id: Id) {
    if !self.selected.remove(&id) && self.candidates.iter().any(|c| c.id() == id) {
      self.selected.insert(id);
    }
  }

  pub fn is_selected(&self, id: Id) -> bool { self.selected.contains(&id) }

  pub fn can_add(&self) -> bool { !self.selected.is_empty() }

  /// The chosen candidates in candidate order. Clears the selection and the
  /// search.
  pub fn take_selected(&mut self) -> Vec<T> {
    let chosen = self
      .candidates
      .iter()
      .filter(|c| self.selected.contains(&c.id()))
      .cloned()
      .collect();
    self.selected.clear();
    self.search.clear();
    chosen
  }

  /// Link the chosen candidates to `left` with `kind`. The selection is kept
  /// when `kind` does not link records of `T`.
  pub async fn attach_to<S: AcademyStore>(
    &mut self,
    store: &S,
    kind: LinkKind,
    left: Id,
  ) -> Result<AttachReport, AttachError<S::Error>> {
    let (_, expected) = kind.ends();
    if expected != T::KIND {
      warn!(%kind, %expected, found = %T::KIND, "selector does not match link kind");
      return Err(AttachError::WrongKind { kind, expected, found: T::KIND });
    }
    let ids: Vec<Id> = self.take_selected().iter().map(Entity::id).collect();
    let report = attach_all(store, kind, left, ids).await.map_err(AttachError::Store)?;
    debug!(%kind, left, attached = ?report.attached, skipped = ?report.skipped, "attached");
    Ok(report)
  }
}
