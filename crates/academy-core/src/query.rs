//! List projections: free-text search, categorical filters and sorting.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Entity, Id};

/// What a list view can search, filter and sort an entity by.
pub trait Searchable {
  /// The display name (name or title); the key for name sorting.
  fn label(&self) -> &str;

  /// Every field that free-text search looks at.
  fn haystack(&self) -> Vec<&str>;

  /// The categorical attribute: a type or a lifecycle status.
  fn category(&self) -> Option<&str> { None }

  /// The date used by date sorting.
  fn date(&self) -> Option<NaiveDate> { None }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortKey {
  NameAsc,
  NameDesc,
  DateAsc,
  DateDesc,
}

/// Parameters for projecting a store's rows into a display list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
  /// Case-insensitive substring matched against [`Searchable::haystack`].
  pub text:     Option<String>,
  /// Exact (case-insensitive) match on [`Searchable::category`].
  pub category: Option<String>,
  /// Restrict to records owned by this program/module/organization.
  pub owner_id: Option<Id>,
  /// Without a sort key, store order is preserved.
  pub sort:     Option<SortKey>,
}

impl ListQuery {
  pub fn text(text: impl Into<String>) -> Self {
    Self { text: Some(text.into()), ..Self::default() }
  }

  pub fn matches<E: Entity>(&self, row: &E) -> bool {
    if let Some(owner) = self.owner_id
      && row.owner_id() != Some(owner)
    {
      return false;
    }
    if let Some(category) = self.category.as_deref().map(str::trim)
      && !category.is_empty()
      && !row
        .category()
        .is_some_and(|c| c.eq_ignore_ascii_case(category))
    {
      return false;
    }
    match self.text.as_deref().map(str::trim) {
      Some(text) if !text.is_empty() => {
        let needle = text.to_lowercase();
        row
          .haystack()
          .iter()
          .any(|field| field.to_lowercase().contains(&needle))
      }
      _ => true,
    }
  }

  /// Filter `rows` (a subsequence, in order) and sort if requested. Sorting
  /// is stable; rows without a date come first in ascending date order.
  pub fn apply<E: Entity>(&self, rows: Vec<E>) -> Vec<E> {
    let mut rows: Vec<E> = rows.into_iter().filter(|r| self.matches(r)).collect();
    match self.sort {
      Some(SortKey::NameAsc) => rows.sort_by_key(|r| r.label().to_lowercase()),
      Some(SortKey::NameDesc) => {
        rows.sort_by_key(|r| std::cmp::Reverse(r.label().to_lowercase()))
      }
      Some(SortKey::DateAsc) => rows.sort_by_key(|r| r.date()),
      Some(SortKey::DateDesc) => rows.sort_by_key(|r| std::cmp::Reverse(r.date())),
      None => {}
    }
    rows
  }
}
