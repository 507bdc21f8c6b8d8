//! Field-level validation of drafts.
//!
//! Validation never touches a store: a draft is checked on its own, and the
//! store separately checks references and uniqueness.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One failed check, tied to the form field that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
  pub field:   String,
  pub message: String,
}

/// An ordered list of field errors. The first message doubles as the banner
/// shown above a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn new() -> Self { Self::default() }

  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self.0.push(FieldError { field: field.to_owned(), message: message.into() });
  }

  /// Record `message` against `field` if `value` is blank.
  pub fn require(&mut self, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
      self.add(field, message);
    }
  }

  /// Record a missing or malformed email address.
  pub fn email(&mut self, field: &str, value: &str) {
    if value.trim().is_empty() {
      self.add(field, "Email is required");
    } else if !looks_like_email(value) {
      self.add(field, format!("{:?} is not a valid email address", value.trim()));
    }
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn fields(&self) -> &[FieldError] { &self.0 }

  /// The message for the first failed field.
  pub fn banner(&self) -> Option<&str> { self.0.first().map(|e| e.message.as_str()) }

  /// The first message recorded against `field`.
  pub fn for_field(&self, field: &str) -> Option<&str> {
    self
      .0
      .iter()
      .find(|e| e.field == field)
      .map(|e| e.message.as_str())
  }

  pub fn into_result(self) -> Result<(), Self> {
    if self.is_empty() { Ok(()) } else { Err(self) }
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
    f.write_str(&messages.join("; "))
  }
}

impl std::error::Error for ValidationErrors {}

/// Implemented by every entity draft.
pub trait Validate {
  fn validate(&self) -> Result<(), ValidationErrors>;
}

/// A deliberately loose shape check: `local@domain.tld`, no whitespace.
pub fn looks_like_email(value: &str) -> bool {
  let value = value.trim();
  if value.chars().any(char::is_whitespace) {
    return false;
  }
  match value.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && !domain.contains('@')
        && domain
          .split_once('.')
          .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
    }
    None => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn require_flags_blank_values() {
    let mut errors = ValidationErrors::new();
    errors.require("name", "   ", "Name is required");
    errors.require("title", "Intro", "Title is required");
    assert_eq!(errors.fields().len(), 1);
    assert_eq!(errors.banner(), Some("Name is required"));
    assert_eq!(errors.for_field("name"), Some("Name is required"));
    assert!(errors.for_field("title").is_none());
  }

  #[test]
  fn email_shapes() {
    assert!(looks_like_email("john.smith@example.com"));
    assert!(looks_like_email("  info@stemcenter.org "));
    assert!(!looks_like_email("john.smith"));
    assert!(!looks_like_email("@example.com"));
    assert!(!looks_like_email("john@localhost"));
    assert!(!looks_like_email("jo hn@example.com"));
    assert!(!looks_like_email("a@b@c.com"));
  }

  #[test]
  fn empty_errors_are_ok() {
    assert!(ValidationErrors::new().into_result().is_ok());
  }

  #[test]
  fn display_joins_messages() {
    let mut errors = ValidationErrors::new();
    errors.add("name", "Name is required");
    errors.add("email", "Email is required");
    assert_eq!(errors.to_string(), "Name is required; Email is required");
  }
}
