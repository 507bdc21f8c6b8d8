//! In-memory backend for the Academy store.
//!
//! A [`Dataset`] behind a [`tokio::sync::RwLock`]: reads share the lock,
//! every mutation holds it exclusively for its whole duration. Contents are
//! lost when the store is dropped.

use academy_core::{
  Entity, Error, Id,
  curriculum::Direction,
  dataset::Dataset,
  link::{Link, LinkEnd, LinkKind, NewLink},
  store::{AcademyStore, DeleteOutcome, DeletePolicy},
};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct MemoryStore {
  data: RwLock<Dataset>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  pub fn with_data(data: Dataset) -> Self { Self { data: RwLock::new(data) } }

  /// A store seeded with [`Dataset::fixtures`].
  pub fn fixtures() -> Self { Self::with_data(Dataset::fixtures()) }
}

impl AcademyStore for MemoryStore {
  type Error = Error;

  async fn insert<E: Entity>(&self, draft: E::Draft) -> Result<E, Error> {
    self.data.write().await.insert(draft)
  }

  async fn get<E: Entity>(&self, id: Id) -> Result<Option<E>, Error> {
    Ok(self.data.read().await.get::<E>(id).cloned())
  }

  async fn list<E: Entity>(&self) -> Result<Vec<E>, Error> {
    Ok(E::rows(&*self.data.read().await).clone())
  }

  async fn children<E: Entity>(&self, owner_id: Id) -> Result<Vec<E>, Error> {
    Ok(self.data.read().await.children(owner_id))
  }

  async fn update<E: Entity>(&self, id: Id, draft: E::Draft) -> Result<Option<E>, Error> {
    self.data.write().await.update(id, draft)
  }

  async fn remove<E: Entity>(&self, id: Id, policy: DeletePolicy) -> Result<DeleteOutcome, Error> {
    let target = academy_core::EntityRef::new(E::KIND, id);
    let outcome = self.data.write().await.remove(target, policy);
    if let DeleteOutcome::Blocked { reason, .. } = &outcome {
      warn!(%target, %reason, "delete blocked");
    }
    Ok(outcome)
  }

  async fn link(&self, link: NewLink) -> Result<Option<Link>, Error> {
    let created = self.data.write().await.link(link, Utc::now())?;
    if let Some(link) = &created {
      debug!(kind = %link.kind, left = link.left_id, right = link.right_id, "linked");
    }
    Ok(created)
  }

  async fn unlink(&self, kind: LinkKind, left: Id, right: Id) -> Result<bool, Error> {
    Ok(self.data.write().await.unlink(kind, left, right))
  }

  async fn links(&self, kind: LinkKind, end: LinkEnd) -> Result<Vec<Link>, Error> {
    Ok(self.data.read().await.links(kind, end))
  }

  async fn set_default(
    &self,
    kind: LinkKind,
    left: Id,
    right: Id,
    is_default: bool,
  ) -> Result<bool, Error> {
    self
      .data
      .write()
      .await
      .set_default(kind, left, right, is_default)
  }

  async fn set_progress(&self, student_id: Id, program_id: Id, progress: u8) -> Result<bool, Error> {
    Ok(
      self
        .data
        .write()
        .await
        .set_progress(student_id, program_id, progress),
    )
  }

  async fn move_item(&self, item_id: Id, direction: Direction) -> Result<bool, Error> {
    Ok(self.data.write().await.move_item(item_id, direction))
  }

  async fn snapshot(&self) -> Result<Dataset, Error> { Ok(self.data.read().await.clone()) }

  async fn restore(&self, data: Dataset) -> Result<(), Error> {
    *self.data.write().await = data;
    Ok(())
  }
}
