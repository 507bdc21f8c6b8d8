//! Programs and their modules.

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{
  Entity, EntityKind, Id,
  dataset::Dataset,
  query::Searchable,
  validate::{Validate, ValidationErrors},
};

// ─── Shared attributes ───────────────────────────────────────────────────────

/// Lifecycle status shared by programs and modules; rendered as a badge.
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
pub enum Status {
  #[default]
  Draft,
  Upcoming,
  Active,
  Completed,
}

/// An inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

impl DateRange {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Self { Self { start, end } }

  pub fn is_ordered(&self) -> bool { self.start <= self.end }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date <= self.end
  }

  fn check(&self, errors: &mut ValidationErrors) {
    if !self.is_ordered() {
      errors.add("dates", "End date must not be before start date");
    }
  }
}

impl Default for DateRange {
  /// Today through thirty days from now, as a new form starts out.
  fn default() -> Self {
    let start = Utc::now().date_naive();
    let end = start.checked_add_days(Days::new(30)).unwrap_or(start);
    Self { start, end }
  }
}

// ─── Program ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
  pub id:          Id,
  pub name:        String,
  pub description: String,
  pub dates:       DateRange,
  pub status:      Status,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramDraft {
  pub name:        String,
  pub description: String,
  pub dates:       DateRange,
  pub status:      Status,
}

impl Validate for ProgramDraft {
  fn validate(&self) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("name", &self.name, "Program name is required");
    self.dates.check(&mut errors);
    errors.into_result()
  }
}

impl Searchable for Program {
  fn label(&self) -> &str { &self.name }

  fn haystack(&self) -> Vec<&str> { vec![&self.name, &self.description] }

  fn category(&self) -> Option<&str> { Some(self.status.as_ref()) }

  fn date(&self) -> Option<NaiveDate> { Some(self.dates.start) }
}

impl Entity for Program {
  type Draft = ProgramDraft;

  const KIND: EntityKind = EntityKind::Program;

  fn id(&self) -> Id { self.id }

  fn build(id: Id, draft: ProgramDraft) -> Self {
    Self {
      id,
      name: draft.name.trim().to_owned(),
      description: draft.description,
      dates: draft.dates,
      status: draft.status,
    }
  }

  fn to_draft(&self) -> ProgramDraft {
    ProgramDraft {
      name:        self.name.clone(),
      description: self.description.clone(),
      dates:       self.dates,
      status:      self.status,
    }
  }

  fn rows(data: &Dataset) -> &Vec<Self> { &data.programs }

  fn rows_mut(data: &mut Dataset) -> &mut Vec<Self> { &mut data.programs }
}

// ─── Module ──────────────────────────────────────────────────────────────────

/// A unit of a program, holding an ordered curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
  pub id:          Id,
  pub program_id:  Id,
  pub name:        String,
  pub description: String,
  pub dates:       DateRange,
  pub status:      Status,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleDraft {
  /// `0` until a program is chosen.
  pub program_id:  Id,
  pub name:        String,
  pub description: String,
  pub dates:       DateRange,
  pub status:      Status,
}

impl Validate for ModuleDraft {
  fn validate(&self) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("name", &self.name, "Module name is required");
    if self.program_id == 0 {
      errors.add("program_id", "Please select a program");
    }
    self.dates.check(&mut errors);
    errors.into_result()
  }
}

impl Searchable for Module {
  fn label(&self) -> &str { &self.name }

  fn haystack(&self) -> Vec<&str> { vec![&self.name, &self.description] }

  fn category(&self) -> Option<&str> { Some(self.status.as_ref()) }

  fn date(&self) -> Option<NaiveDate> { Some(self.dates.start) }
}

impl Entity for Module {
  type Draft = ModuleDraft;

  const KIND: EntityKind = EntityKind::Module;

  fn id(&self) -> Id { self.id }

  fn build(id: Id, draft: ModuleDraft) -> Self {
    Self {
      id,
      program_id: draft.program_id,
      name: draft.name.trim().to_owned(),
      description: draft.description,
      dates: draft.dates,
      status: draft.status,
    }
  }

  fn to_draft(&self) -> ModuleDraft {
    ModuleDraft {
      program_id:  self.program_id,
      name:        self.name.clone(),
      description: self.description.clone(),
      dates:       self.dates,
      status:      self.status,
    }
  }

  fn owner_id(&self) -> Option<Id> { Some(self.program_id) }

  fn rows(data: &Dataset) -> &Vec<Self> { &data.modules }

  fn rows_mut(data: &mut Dataset) -> &mut Vec<Self> { &mut data.modules }
}
