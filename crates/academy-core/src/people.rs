//! Students, parents and the organizations students belong to.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Entity, EntityKind, Id,
  dataset::Dataset,
  query::Searchable,
  validate::{Validate, ValidationErrors},
};

/// Students are placed on an ordinal level in this range.
pub const LEVELS: std::ops::RangeInclusive<u8> = 1..=10;

// ─── Student ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
  pub id:              Id,
  pub name:            String,
  pub email:           String,
  pub birth_date:      NaiveDate,
  pub level:           u8,
  pub organization_id: Option<Id>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentDraft {
  pub name:            String,
  pub email:           String,
  pub birth_date:      NaiveDate,
  pub level:           u8,
  pub organization_id: Option<Id>,
}

impl Default for StudentDraft {
  fn default() -> Self {
    Self {
      name:            String::new(),
      email:           String::new(),
      birth_date:      NaiveDate::default(),
      level:           *LEVELS.start(),
      organization_id: None,
    }
  }
}

impl Validate for StudentDraft {
  fn validate(&self) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("name", &self.name, "Student name is required");
    errors.email("email", &self.email);
    if !LEVELS.contains(&self.level) {
      errors.add("level", "Level must be between 1 and 10");
    }
    errors.into_result()
  }
}

impl Searchable for Student {
  fn label(&self) -> &str { &self.name }

  fn haystack(&self) -> Vec<&str> { vec![&self.name, &self.email] }

  fn date(&self) -> Option<NaiveDate> { Some(self.birth_date) }
}

impl Entity for Student {
  type Draft = StudentDraft;

  const KIND: EntityKind = EntityKind::Student;

  fn id(&self) -> Id { self.id }

  fn build(id: Id, draft: StudentDraft) -> Self {
    Self {
      id,
      name: draft.name.trim().to_owned(),
      email: draft.email.trim().to_owned(),
      birth_date: draft.birth_date,
      level: draft.level,
      organization_id: draft.organization_id,
    }
  }

  fn to_draft(&self) -> StudentDraft {
    StudentDraft {
      name:            self.name.clone(),
      email:           self.email.clone(),
      birth_date:      self.birth_date,
      level:           self.level,
      organization_id: self.organization_id,
    }
  }

  fn owner_id(&self) -> Option<Id> { self.organization_id }

  fn detach(&mut self) { self.organization_id = None; }

  fn rows(data: &Dataset) -> &Vec<Self> { &data.students }

  fn rows_mut(data: &mut Dataset) -> &mut Vec<Self> { &mut data.students }
}

// ─── Parent ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parent {
  pub id:    Id,
  pub name:  String,
  pub email: String,
  pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentDraft {
  pub name:  String,
  pub email: String,
  pub phone: String,
}

impl Validate for ParentDraft {
  fn validate(&self) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("name", &self.name, "Parent name is required");
    errors.email("email", &self.email);
    errors.require("phone", &self.phone, "Phone number is required");
    errors.into_result()
  }
}

impl Searchable for Parent {
  fn label(&self) -> &str { &self.name }

  fn haystack(&self) -> Vec<&str> { vec![&self.name, &self.email, &self.phone] }
}

impl Entity for Parent {
  type Draft = ParentDraft;

  const KIND: EntityKind = EntityKind::Parent;

  fn id(&self) -> Id { self.id }

  fn build(id: Id, draft: ParentDraft) -> Self {
    Self {
      id,
      name: draft.name.trim().to_owned(),
      email: draft.email.trim().to_owned(),
      phone: draft.phone.trim().to_owned(),
    }
  }

  fn to_draft(&self) -> ParentDraft {
    ParentDraft {
      name:  self.name.clone(),
      email: self.email.clone(),
      phone: self.phone.clone(),
    }
  }

  fn rows(data: &Dataset) -> &Vec<Self> { &data.parents }

  fn rows_mut(data: &mut Dataset) -> &mut Vec<Self> { &mut data.parents }
}

// ─── Organization ────────────────────────────────────────────────────────────

/// A school or center that students are enrolled through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
  pub id:             Id,
  pub name:           String,
  pub email:          String,
  pub contact_person: String,
  pub contact_phone:  String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationDraft {
  pub name:           String,
  pub email:          String,
  pub contact_person: String,
  pub contact_phone:  String,
}

impl Validate for OrganizationDraft {
  fn validate(&self) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("name", &self.name, "Organization name is required");
    errors.email("email", &self.email);
    errors.require("contact_person", &self.contact_person, "Contact person is required");
    errors.require("contact_phone", &self.contact_phone, "Contact phone is required");
    errors.into_result()
  }
}

impl Searchable for Organization {
  fn label(&self) -> &str { &self.name }

  fn haystack(&self) -> Vec<&str> {
    vec![&self.name, &self.email, &self.contact_person]
  }
}

impl Entity for Organization {
  type Draft = OrganizationDraft;

  const KIND: EntityKind = EntityKind::Organization;

  fn id(&self) -> Id { self.id }

  fn build(id: Id, draft: OrganizationDraft) -> Self {
    Self {
      id,
      name: draft.name.trim().to_owned(),
      email: draft.email.trim().to_owned(),
      contact_person: draft.contact_person.trim().to_owned(),
      contact_phone: draft.contact_phone.trim().to_owned(),
    }
  }

  fn to_draft(&self) -> OrganizationDraft {
    OrganizationDraft {
      name:           self.name.clone(),
      email:          self.email.clone(),
      contact_person: self.contact_person.clone(),
      contact_phone:  self.contact_phone.clone(),
    }
  }

  fn rows(data: &Dataset) -> &Vec<Self> { &data.organizations }

  fn rows_mut(data: &mut Dataset) -> &mut Vec<Self> { &mut data.organizations }
}
