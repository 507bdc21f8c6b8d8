//! A searchable, sortable list page with row deletion.

use academy_core::{
  Entity, EntityRef, Id,
  query::{ListQuery, Searchable},
  store::{AcademyStore, DeleteOutcome, DeletePolicy},
};
use tracing::{debug, warn};

use crate::confirm::ConfirmDelete;

/// What the list area shows.
#[derive(Debug, PartialEq)]
pub enum ListState<'a, E> {
  Empty { message: String },
  Rows(&'a [E]),
}

pub struct ListView<E: Entity> {
  pub query:   ListQuery,
  rows:        Vec<E>,
  pub confirm: ConfirmDelete<EntityRef>,
}

impl<E: Entity> Default for ListView<E> {
  fn default() -> Self { Self::new(ListQuery::default()) }
}

impl<E: Entity> ListView<E> {
  pub fn new(query: ListQuery) -> Self {
    Self { query, rows: Vec::new(), confirm: ConfirmDelete::Idle }
  }

  /// Reload the rows from `store` through the current query.
  pub async fn refresh<S: AcademyStore>(&mut self, store: &S) -> Result<(), S::Error> {
    let all = store.list::<E>().await?;
    self.rows = self.query.apply(all);
    Ok(())
  }

  pub fn rows(&self) -> &[E] { &self.rows }

  pub fn state(&self) -> ListState<'_, E> {
    if self.rows.is_empty() {
      ListState::Empty { message: format!("No {}s found.", E::KIND.noun()) }
    } else {
      ListState::Rows(&self.rows)
    }
  }

  /// Ask to delete the row with `id`. Returns false when no such row is
  /// shown.
  pub fn request_delete(&mut self, id: Id) -> bool {
    let Some(row) = self.rows.iter().find(|r| r.id() == id) else {
      return false;
    };
    let noun = E::KIND.noun();
    let title = format!("Delete {}{}", noun[..1].to_uppercase(), &noun[1..]);
    let description = format!(
      "Are you sure you want to delete {}? This action cannot be undone.",
      row.label()
    );
    self.confirm.request(row.entity_ref(), title, description);
    true
  }

  pub fn cancel_delete(&mut self) { self.confirm.cancel(); }

  /// Carry out the pending delete, if any, and reload the rows.
  pub async fn confirm_delete<S: AcademyStore>(
    &mut self,
    store: &S,
    policy: DeletePolicy,
  ) -> Result<Option<DeleteOutcome>, S::Error> {
    let Some(target) = self.confirm.confirm() else {
      return Ok(None);
    };
    let outcome = store.remove::<E>(target.id, policy).await?;
    match &outcome {
      DeleteOutcome::Blocked { reason, .. } => warn!(%target, reason, "delete blocked"),
      outcome => debug!(%target, ?outcome, "delete confirmed"),
    }
    self.refresh(store).await?;
    Ok(Some(outcome))
  }
}

#[cfg(test)]
mod tests {
  use academy_core::{
    EntityKind,
    achievement::Achievement,
    curriculum::CurriculumItem,
    people::Student,
    program::{Program, Status},
    query::SortKey,
  };
  use academy_store_memory::MemoryStore;

  use super::*;

  #[tokio::test]
  async fn filtered_list_shows_empty_message() {
    let store = MemoryStore::fixtures();
    let mut view = ListView::<CurriculumItem>::new(ListQuery::text("kotlin"));
    view.refresh(&store).await.unwrap();
    assert_eq!(
      view.state(),
      ListState::Empty { message: "No curriculum items found.".into() }
    );
  }

  #[tokio::test]
  async fn query_filters_and_sorts_rows() {
    let store = MemoryStore::fixtures();
    let mut view = ListView::<Program>::new(ListQuery {
      category: Some(Status::Upcoming.to_string()),
      sort: Some(SortKey::DateDesc),
      ..Default::default()
    });
    view.refresh(&store).await.unwrap();
    let ids: Vec<_> = view.rows().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![6, 4]);

    let mut view = ListView::<Achievement>::new(ListQuery {
      category: Some("certificate".into()),
      ..Default::default()
    });
    view.refresh(&store).await.unwrap();
    assert!(matches!(view.state(), ListState::Rows(rows) if rows.len() == 2));
  }

  #[tokio::test]
  async fn confirmed_delete_removes_the_row() {
    let store = MemoryStore::fixtures();
    let mut view = ListView::<Student>::default();
    view.refresh(&store).await.unwrap();

    assert!(view.request_delete(3));
    match &view.confirm {
      ConfirmDelete::Pending { title, description, .. } => {
        assert_eq!(title, "Delete Student");
        assert!(description.contains("Michael Brown"));
      }
      ConfirmDelete::Idle => panic!("expected a pending delete"),
    }

    let outcome = view.confirm_delete(&store, DeletePolicy::Restrict).await.unwrap();
    assert_eq!(outcome, Some(DeleteOutcome::Deleted));
    assert!(view.rows().iter().all(|s| s.id != 3));
    assert_eq!(store.get::<Student>(3).await.unwrap(), None);
  }

  #[tokio::test]
  async fn cancelled_delete_leaves_the_store_alone() {
    let store = MemoryStore::fixtures();
    let before = store.snapshot().await.unwrap();
    let mut view = ListView::<Student>::default();
    view.refresh(&store).await.unwrap();

    assert!(view.request_delete(3));
    view.cancel_delete();
    assert_eq!(view.confirm_delete(&store, DeletePolicy::Restrict).await.unwrap(), None);
    assert_eq!(store.snapshot().await.unwrap(), before);
    assert_eq!(view.rows().len(), 7);
  }

  #[tokio::test]
  async fn blocked_delete_keeps_the_program() {
    let store = MemoryStore::fixtures();
    let mut view = ListView::<Program>::default();
    view.refresh(&store).await.unwrap();

    assert!(!view.request_delete(42));
    assert!(view.request_delete(1));
    let outcome = view.confirm_delete(&store, DeletePolicy::Restrict).await.unwrap();
    match outcome {
      Some(DeleteOutcome::Blocked { dependents, .. }) => {
        assert!(dependents.iter().all(|d| d.kind == EntityKind::Module));
      }
      other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(view.rows().len(), 6);
  }
}
