//! Curriculum items: the ordered lessons, projects and evaluations of a
//! module.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{
  Entity, EntityKind, Error, Id,
  content::ContentKind,
  dataset::Dataset,
  query::Searchable,
  validate::{Validate, ValidationErrors},
};

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemType {
  #[default]
  Lesson,
  Project,
  Evaluation,
}

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeliveryMode {
  #[default]
  Solo,
  Group,
}

/// Where an item's material lives: an uploaded-file stand-in (`blob:` URL)
/// or an external link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
  pub url:        String,
  /// MIME type, when known (uploads always carry one).
  pub media_type: Option<String>,
}

impl ContentRef {
  pub fn link(url: impl Into<String>) -> Self {
    Self { url: url.into(), media_type: None }
  }

  pub fn kind(&self) -> ContentKind {
    ContentKind::classify(&self.url, self.media_type.as_deref())
  }
}

/// Reorder direction within a module.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
  Up,
  Down,
}

impl Direction {
  pub fn reverse(self) -> Self {
    match self {
      Self::Up => Self::Down,
      Self::Down => Self::Up,
    }
  }
}

// ─── CurriculumItem ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumItem {
  pub id:            Id,
  pub module_id:     Id,
  pub title:         String,
  pub description:   String,
  pub item_type:     ItemType,
  pub delivery_mode: DeliveryMode,
  /// 1-based, unique and dense within the module.
  pub position:      u32,
  pub content:       Option<ContentRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurriculumItemDraft {
  /// `0` until a module is chosen.
  pub module_id:     Id,
  pub title:         String,
  pub description:   String,
  pub item_type:     ItemType,
  pub delivery_mode: DeliveryMode,
  /// Absent to append to the module (or keep the current slot when editing).
  pub position:      Option<u32>,
  pub content:       Option<ContentRef>,
}

impl Default for CurriculumItemDraft {
  fn default() -> Self {
    Self {
      module_id:     0,
      title:         String::new(),
      description:   String::new(),
      item_type:     ItemType::default(),
      delivery_mode: DeliveryMode::default(),
      position:      None,
      content:       None,
    }
  }
}

impl Validate for CurriculumItemDraft {
  fn validate(&self) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("title", &self.title, "Title is required");
    if self.module_id == 0 {
      errors.add("module_id", "Please select a module");
    }
    if self.position == Some(0) {
      errors.add("position", "Position must be a positive number");
    }
    match &self.content {
      Some(content) if !content.url.trim().is_empty() => {}
      _ => errors.add("content", "Please upload a file or provide a URL"),
    }
    errors.into_result()
  }
}

impl Searchable for CurriculumItem {
  fn label(&self) -> &str { &self.title }

  fn haystack(&self) -> Vec<&str> { vec![&self.title, &self.description] }

  fn category(&self) -> Option<&str> { Some(self.item_type.as_ref()) }
}

impl Entity for CurriculumItem {
  type Draft = CurriculumItemDraft;

  const KIND: EntityKind = EntityKind::CurriculumItem;

  fn id(&self) -> Id { self.id }

  fn build(id: Id, draft: CurriculumItemDraft) -> Self {
    Self {
      id,
      module_id: draft.module_id,
      title: draft.title.trim().to_owned(),
      description: draft.description,
      item_type: draft.item_type,
      delivery_mode: draft.delivery_mode,
      // 0 marks an unplaced item; `arrange` settles it.
      position: draft.position.unwrap_or(0),
      content: draft.content,
    }
  }

  fn to_draft(&self) -> CurriculumItemDraft {
    CurriculumItemDraft {
      module_id:     self.module_id,
      title:         self.title.clone(),
      description:   self.description.clone(),
      item_type:     self.item_type,
      delivery_mode: self.delivery_mode,
      position:      Some(self.position),
      content:       self.content.clone(),
    }
  }

  fn owner_id(&self) -> Option<Id> { Some(self.module_id) }

  /// An item entering a module (insert, or a move from another module) may
  /// take any free slot in `1..=n+1`. An item repositioned within its module
  /// takes the slot and the others shift to keep positions dense.
  fn arrange(
    &mut self,
    previous: Option<&Self>,
    siblings: &[Self],
  ) -> Result<Vec<Self>, Error> {
    let staying = previous.filter(|p| p.module_id == self.module_id);
    if self.position == 0 {
      self.position = match staying {
        Some(previous) => previous.position,
        None => next_position(siblings),
      };
    }

    let max = ordinal(siblings.len());
    if self.position > max {
      return Err(Error::PositionOutOfRange {
        module_id: self.module_id,
        position:  self.position,
        max,
      });
    }

    if staying.is_some() {
      return Ok(shift_around(self, siblings));
    }
    if siblings.iter().any(|s| s.position == self.position) {
      return Err(Error::PositionTaken {
        module_id: self.module_id,
        position:  self.position,
      });
    }
    Ok(Vec::new())
  }

  fn rows(data: &Dataset) -> &Vec<Self> { &data.curriculum_items }

  fn rows_mut(data: &mut Dataset) -> &mut Vec<Self> { &mut data.curriculum_items }
}

/// The position a new item appended to a module receives.
pub fn next_position<'a>(items: impl IntoIterator<Item = &'a CurriculumItem>) -> u32 {
  items.into_iter().map(|i| i.position).max().unwrap_or(0) + 1
}

fn ordinal(index: usize) -> u32 { u32::try_from(index + 1).unwrap_or(u32::MAX) }

/// Slot `item` into its siblings' order at `item.position` and renumber the
/// siblings around it. Returns only the siblings whose position changed.
fn shift_around(item: &CurriculumItem, siblings: &[CurriculumItem]) -> Vec<CurriculumItem> {
  let mut order: Vec<&CurriculumItem> = siblings.iter().collect();
  order.sort_by_key(|s| s.position);
  let slot = (item.position as usize).saturating_sub(1).min(order.len());
  order.insert(slot, item);

  order
    .into_iter()
    .enumerate()
    .filter(|(_, s)| s.id != item.id)
    .filter_map(|(index, s)| {
      let position = ordinal(index);
      (s.position != position).then(|| CurriculumItem { position, ..s.clone() })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn draft() -> CurriculumItemDraft {
    CurriculumItemDraft {
      module_id: 1,
      title: "HTML Forms".into(),
      content: Some(ContentRef::link("/curriculum/html-forms.pdf")),
      ..Default::default()
    }
  }

  #[test]
  fn title_and_content_are_required() {
    let errors = CurriculumItemDraft { module_id: 1, ..Default::default() }
      .validate()
      .unwrap_err();
    assert_eq!(errors.banner(), Some("Title is required"));
    assert_eq!(
      errors.for_field("content"),
      Some("Please upload a file or provide a URL")
    );
  }

  #[test]
  fn position_must_be_positive() {
    let errors = CurriculumItemDraft { position: Some(0), ..draft() }.validate().unwrap_err();
    assert!(errors.for_field("position").is_some());
    assert!(draft().validate().is_ok());
  }

  fn module_one() -> Vec<CurriculumItem> {
    (1..=3)
      .map(|n| CurriculumItem::build(n, CurriculumItemDraft { position: Some(n), ..draft() }))
      .collect()
  }

  #[test]
  fn new_item_appends_without_a_position() {
    let mut item = CurriculumItem::build(4, draft());
    assert!(item.arrange(None, &module_one()).unwrap().is_empty());
    assert_eq!(item.position, 4);
  }

  #[test]
  fn new_item_cannot_take_a_used_slot() {
    let mut item = CurriculumItem::build(4, CurriculumItemDraft { position: Some(2), ..draft() });
    assert!(matches!(
      item.arrange(None, &module_one()),
      Err(Error::PositionTaken { module_id: 1, position: 2 })
    ));
  }

  #[test]
  fn new_item_cannot_leave_a_gap() {
    let mut item = CurriculumItem::build(4, CurriculumItemDraft { position: Some(10), ..draft() });
    assert!(matches!(
      item.arrange(None, &module_one()),
      Err(Error::PositionOutOfRange { module_id: 1, position: 10, max: 4 })
    ));
  }

  #[test]
  fn repositioning_shifts_the_others() {
    let all = module_one();
    let (first, rest) = (&all[0], &all[1..]);
    let mut moved = CurriculumItem { position: 3, ..first.clone() };
    let shifted = moved.arrange(Some(first), rest).unwrap();
    let positions: Vec<_> = shifted.iter().map(|s| (s.id, s.position)).collect();
    assert_eq!(positions, vec![(2, 1), (3, 2)]);

    let mut too_far = CurriculumItem { position: 4, ..first.clone() };
    assert!(matches!(
      too_far.arrange(Some(first), rest),
      Err(Error::PositionOutOfRange { max: 3, .. })
    ));
  }

  #[test]
  fn editing_without_a_position_keeps_the_slot() {
    let all = module_one();
    let mut edited = CurriculumItem::build(2, draft());
    let shifted = edited.arrange(Some(&all[1]), &[all[0].clone(), all[2].clone()]).unwrap();
    assert_eq!(edited.position, 2);
    assert!(shifted.is_empty());
  }

  #[test]
  fn next_position_follows_the_last() {
    assert_eq!(next_position([]), 1);
    let items = [
      CurriculumItem { position: 1, ..CurriculumItem::build(1, draft()) },
      CurriculumItem { position: 4, ..CurriculumItem::build(2, draft()) },
    ];
    assert_eq!(next_position(&items), 5);
  }

  #[test]
  fn direction_reverses() {
    assert_eq!(Direction::Up.reverse(), Direction::Down);
    assert_eq!("down".parse::<Direction>().unwrap(), Direction::Down);
  }
}
