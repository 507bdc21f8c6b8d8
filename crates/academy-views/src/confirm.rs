//! Two-step delete confirmation.

use std::mem;

/// A delete waiting on the user's yes or no.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmDelete<T> {
  Idle,
  Pending {
    target:      T,
    title:       String,
    description: String,
  },
}

impl<T> Default for ConfirmDelete<T> {
  fn default() -> Self { Self::Idle }
}

impl<T> ConfirmDelete<T> {
  /// Ask for confirmation. A request already pending is replaced.
  pub fn request(&mut self, target: T, title: impl Into<String>, description: impl Into<String>) {
    *self = Self::Pending {
      target,
      title: title.into(),
      description: description.into(),
    };
  }

  pub fn is_pending(&self) -> bool { matches!(self, Self::Pending { .. }) }

  pub fn target(&self) -> Option<&T> {
    match self {
      Self::Pending { target, .. } => Some(target),
      Self::Idle => None,
    }
  }

  /// Discard the pending target.
  pub fn cancel(&mut self) { *self = Self::Idle; }

  /// Yield the pending target and return to idle. A second call yields
  /// nothing.
  pub fn confirm(&mut self) -> Option<T> {
    match mem::replace(self, Self::Idle) {
      Self::Pending { target, .. } => Some(target),
      Self::Idle => None,
    }
  }
}
