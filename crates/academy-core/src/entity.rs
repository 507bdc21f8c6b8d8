//! Entity identity: the kinds of record the store holds and the trait every
//! record type implements.

use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{Error, dataset::Dataset, query::Searchable, validate::Validate};

/// Identifiers are small positive integers, unique within their entity kind.
pub type Id = u32;

// ─── Kinds ───────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
  Student,
  Parent,
  Organization,
  Program,
  Module,
  CurriculumItem,
  Achievement,
}

/// What happens to a child record when its owner is deleted with
/// [`DeletePolicy::Cascade`](crate::store::DeletePolicy::Cascade).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
  /// The child is deleted as well (recursively).
  Remove,
  /// The child survives with its foreign key cleared.
  Detach,
}

/// A foreign key from one entity kind to its owning kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
  pub parent:    EntityKind,
  /// Name of the foreign-key field in the child's serialised form.
  pub field:     &'static str,
  pub on_delete: OnDelete,
}

impl EntityKind {
  /// Lower-case singular noun, used in user-facing messages.
  pub fn noun(self) -> &'static str {
    match self {
      Self::Student => "student",
      Self::Parent => "parent",
      Self::Organization => "organization",
      Self::Program => "program",
      Self::Module => "module",
      Self::CurriculumItem => "curriculum item",
      Self::Achievement => "achievement",
    }
  }

  /// The path segment of the collection (`/students`, `/curriculum`, ...).
  pub fn collection(self) -> &'static str {
    match self {
      Self::Student => "students",
      Self::Parent => "parents",
      Self::Organization => "organizations",
      Self::Program => "programs",
      Self::Module => "modules",
      Self::CurriculumItem => "curriculum",
      Self::Achievement => "achievements",
    }
  }

  pub fn from_collection(segment: &str) -> Option<Self> {
    Self::iter().find(|k| k.collection() == segment)
  }

  /// The owning kind of this kind, if any.
  pub fn ownership(self) -> Option<Ownership> {
    match self {
      Self::Student => Some(Ownership {
        parent:    Self::Organization,
        field:     "organization_id",
        on_delete: OnDelete::Detach,
      }),
      Self::Module => Some(Ownership {
        parent:    Self::Program,
        field:     "program_id",
        on_delete: OnDelete::Remove,
      }),
      Self::CurriculumItem => Some(Ownership {
        parent:    Self::Module,
        field:     "module_id",
        on_delete: OnDelete::Remove,
      }),
      _ => None,
    }
  }

  /// Kinds owned by this kind, with their ownership rule.
  pub fn children(self) -> impl Iterator<Item = (EntityKind, Ownership)> {
    Self::iter().filter_map(move |kind| {
      kind
        .ownership()
        .filter(|o| o.parent == self)
        .map(|o| (kind, o))
    })
  }
}

// ─── References ──────────────────────────────────────────────────────────────

/// A typed pointer to one record.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityRef {
  pub kind: EntityKind,
  pub id:   Id,
}

impl EntityRef {
  pub fn new(kind: EntityKind, id: Id) -> Self { Self { kind, id } }
}

impl fmt::Display for EntityRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.kind.noun(), self.id)
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A record type held by an [`AcademyStore`](crate::store::AcademyStore).
///
/// Every entity has an editable [`Draft`](Entity::Draft), its attributes
/// without the id, which is what forms and API bodies carry. Stores assign
/// ids and call [`Entity::build`].
pub trait Entity:
  Clone
  + fmt::Debug
  + PartialEq
  + Serialize
  + DeserializeOwned
  + Searchable
  + Send
  + Sync
  + 'static
{
  type Draft: Validate
    + Clone
    + Default
    + fmt::Debug
    + PartialEq
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static;

  const KIND: EntityKind;

  fn id(&self) -> Id;

  /// Assemble a record from an id and a (validated) draft.
  fn build(id: Id, draft: Self::Draft) -> Self;

  /// The editable attributes of this record, e.g. to pre-fill an edit form.
  fn to_draft(&self) -> Self::Draft;

  /// The owning record's id, for kinds with an [`Ownership`].
  fn owner_id(&self) -> Option<Id> { None }

  /// Clear the owner foreign key. Only meaningful for
  /// [`OnDelete::Detach`] kinds.
  fn detach(&mut self) {}

  /// Settle this record against its siblings (the other records sharing its
  /// owner) before it is written. `previous` is the stored version when
  /// updating. Returns the siblings whose stored form must change as a
  /// consequence, or the error that forbids the write.
  fn arrange(
    &mut self,
    _previous: Option<&Self>,
    _siblings: &[Self],
  ) -> Result<Vec<Self>, Error> {
    Ok(Vec::new())
  }

  fn rows(data: &Dataset) -> &Vec<Self>;

  fn rows_mut(data: &mut Dataset) -> &mut Vec<Self>;

  fn entity_ref(&self) -> EntityRef { EntityRef::new(Self::KIND, self.id()) }
}

/// The id a new record of a kind receives: one past the current maximum.
pub fn next_id(existing: impl IntoIterator<Item = Id>) -> Id {
  existing.into_iter().max().unwrap_or(0) + 1
}
