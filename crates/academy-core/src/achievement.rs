//! The achievement library. Achievements are standalone records that
//! programs, modules and curriculum items reference through links.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{
  Entity, EntityKind, Id,
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
pub enum AchievementType {
  #[default]
  Badge,
  Certificate,
  Achievement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
  pub id:               Id,
  pub name:             String,
  pub achievement_type: AchievementType,
  pub description:      String,
  pub criteria:         String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchievementDraft {
  pub name:             String,
  pub achievement_type: AchievementType,
  pub description:      String,
  pub criteria:         String,
}

impl Validate for AchievementDraft {
  fn validate(&self) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require("name", &self.name, "Achievement name is required");
    errors.into_result()
  }
}

impl Searchable for Achievement {
  fn label(&self) -> &str { &self.name }

  fn haystack(&self) -> Vec<&str> { vec![&self.name, &self.description, &self.criteria] }

  fn category(&self) -> Option<&str> { Some(self.achievement_type.as_ref()) }
}

impl Entity for Achievement {
  type Draft = AchievementDraft;

  const KIND: EntityKind = EntityKind::Achievement;

  fn id(&self) -> Id { self.id }

  fn build(id: Id, draft: AchievementDraft) -> Self {
    Self {
      id,
      name: draft.name.trim().to_owned(),
      achievement_type: draft.achievement_type,
      description: draft.description,
      criteria: draft.criteria,
    }
  }

  fn to_draft(&self) -> AchievementDraft {
    AchievementDraft {
      name:             self.name.clone(),
      achievement_type: self.achievement_type,
      description:      self.description.clone(),
      criteria:         self.criteria.clone(),
    }
  }

  fn rows(data: &Dataset) -> &Vec<Self> { &data.achievements }

  fn rows_mut(data: &mut Dataset) -> &mut Vec<Self> { &mut data.achievements }
}
