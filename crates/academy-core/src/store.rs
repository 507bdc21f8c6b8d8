//! The `AcademyStore` repository trait and its delete vocabulary.
//!
//! Storage backends (`academy-store-memory`, `academy-store-sqlite`)
//! implement the trait; the API and view layers depend only on it.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  Entity, EntityRef, Error, Id,
  curriculum::Direction,
  dataset::Dataset,
  link::{Link, LinkEnd, LinkKind, NewLink},
};

// ─── Deletes ─────────────────────────────────────────────────────────────────

/// How a delete treats records that depend on its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
  /// Refuse while owned records exist.
  #[default]
  Restrict,
  /// Remove owned records (recursively) and detach optional dependents.
  Cascade,
}

impl DeletePolicy {
  pub fn cascade(cascade: bool) -> Self {
    if cascade { Self::Cascade } else { Self::Restrict }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome {
  Deleted,
  Blocked {
    reason:     String,
    dependents: Vec<EntityRef>,
  },
  /// The target was removed along with, or after detaching, `affected`.
  CascadedDeleted {
    affected: Vec<EntityRef>,
  },
  NotFound,
}

impl DeleteOutcome {
  pub fn blocked(target: EntityRef, dependents: Vec<EntityRef>) -> Self {
    let reason = match dependents.as_slice() {
      [only] => format!("{target} is still referenced by {only}"),
      _ => format!("{target} is still referenced by {} records", dependents.len()),
    };
    Self::Blocked { reason, dependents }
  }

  /// Whether the target no longer exists after this outcome.
  pub fn removed(&self) -> bool {
    matches!(self, Self::Deleted | Self::CascadedDeleted { .. })
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Backend errors that can carry a domain [`Error`].
///
/// Callers use [`StoreError::core`] to tell caller mistakes (validation,
/// dangling references, ...) from backend failures.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn core(&self) -> Option<&Error>;

  /// The domain error, if it was caused by caller input.
  fn user_error(&self) -> Option<&Error> { self.core().filter(|e| e.is_user_error()) }
}

impl StoreError for Error {
  fn core(&self) -> Option<&Error> { Some(self) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an Academy repository backend.
///
/// Every method is atomic with respect to other calls on the same store.
/// All methods return `Send` futures so stores can be shared across tasks
/// (e.g. behind `Arc` in an axum router).
pub trait AcademyStore: Send + Sync {
  type Error: StoreError;

  // ── Entities ──────────────────────────────────────────────────────────

  /// Validate `draft`, check its references and sibling uniqueness, assign
  /// the next id and append the record.
  fn insert<E: Entity>(
    &self,
    draft: E::Draft,
  ) -> impl Future<Output = Result<E, Self::Error>> + Send + '_;

  fn get<E: Entity>(
    &self,
    id: Id,
  ) -> impl Future<Output = Result<Option<E>, Self::Error>> + Send + '_;

  /// All records of a kind, in store order.
  fn list<E: Entity>(&self) -> impl Future<Output = Result<Vec<E>, Self::Error>> + Send + '_;

  /// Records of a kind owned by `owner_id`, in store order.
  fn children<E: Entity>(
    &self,
    owner_id: Id,
  ) -> impl Future<Output = Result<Vec<E>, Self::Error>> + Send + '_;

  /// Replace the editable fields of a record. Returns `None` when `id` does
  /// not exist.
  fn update<E: Entity>(
    &self,
    id: Id,
    draft: E::Draft,
  ) -> impl Future<Output = Result<Option<E>, Self::Error>> + Send + '_;

  fn remove<E: Entity>(
    &self,
    id: Id,
    policy: DeletePolicy,
  ) -> impl Future<Output = Result<DeleteOutcome, Self::Error>> + Send + '_;

  // ── Links ─────────────────────────────────────────────────────────────

  /// Create a link. Returns `None` when the pair is already linked.
  fn link(
    &self,
    link: NewLink,
  ) -> impl Future<Output = Result<Option<Link>, Self::Error>> + Send + '_;

  /// Returns whether a link was removed.
  fn unlink(
    &self,
    kind: LinkKind,
    left: Id,
    right: Id,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Links of a kind, in the order they were made.
  fn links(
    &self,
    kind: LinkKind,
    end: LinkEnd,
  ) -> impl Future<Output = Result<Vec<Link>, Self::Error>> + Send + '_;

  /// Set the auto-grant flag of a program or module achievement link.
  /// Returns whether the link exists.
  fn set_default(
    &self,
    kind: LinkKind,
    left: Id,
    right: Id,
    is_default: bool,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Set an enrollment's progress, clamped to 100. Returns whether the
  /// enrollment exists.
  fn set_progress(
    &self,
    student_id: Id,
    program_id: Id,
    progress: u8,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Curriculum ordering ───────────────────────────────────────────────

  /// Swap a curriculum item with its neighbor in `direction`. Returns
  /// `false` (and changes nothing) at either end or for an unknown item.
  fn move_item(
    &self,
    item_id: Id,
    direction: Direction,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Whole-store ───────────────────────────────────────────────────────

  fn snapshot(&self) -> impl Future<Output = Result<Dataset, Self::Error>> + Send + '_;

  /// Replace the entire contents of the store.
  fn restore(&self, data: Dataset) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Require a link kind to carry the auto-grant flag.
pub fn check_default_kind(kind: LinkKind) -> Result<(), Error> {
  if kind.has_default() {
    Ok(())
  } else {
    Err(Error::InvalidLink(format!("{kind} links have no default flag")))
  }
}
