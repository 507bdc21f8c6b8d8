//! [`SqliteStore`]: the SQLite implementation of [`AcademyStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _};
use strum::IntoEnumIterator as _;
use tracing::{debug, warn};

use academy_core::{
  Entity, EntityKind, EntityRef, Id,
  achievement::Achievement,
  curriculum::{CurriculumItem, Direction},
  dataset::Dataset,
  entity::{OnDelete, next_id},
  link::{Link, LinkEnd, LinkKind, NewLink},
  people::{Organization, Parent, Student},
  program::{Module, Program},
  store::{AcademyStore, DeleteOutcome, DeletePolicy, check_default_kind},
  validate::Validate,
};

use crate::{
  Error, Result,
  encode::{RawLink, decode_body, encode_body, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Academy store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the connection thread.
  async fn read<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(&*conn))).await?
  }

  /// Run `f` inside a transaction, committed only if `f` succeeds.
  async fn write<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        match f(&tx) {
          Ok(value) => {
            tx.commit()?;
            Ok(Ok(value))
          }
          Err(e) => Ok(Err(e)),
        }
      })
      .await?
  }
}

// ─── Row access ──────────────────────────────────────────────────────────────

fn exists(conn: &Connection, target: EntityRef) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM records WHERE kind = ?1 AND id = ?2",
        rusqlite::params![target.kind.as_ref(), target.id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn decode_rows<E: Entity>(
  conn: &Connection,
  sql: &str,
  params: impl rusqlite::Params,
) -> Result<Vec<E>> {
  let mut stmt = conn.prepare(sql)?;
  let bodies = stmt
    .query_map(params, |row| row.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  bodies.iter().map(|b| decode_body(b)).collect()
}

fn rows<E: Entity>(conn: &Connection) -> Result<Vec<E>> {
  decode_rows(
    conn,
    "SELECT body FROM records WHERE kind = ?1 ORDER BY seq",
    rusqlite::params![E::KIND.as_ref()],
  )
}

fn owned<E: Entity>(conn: &Connection, owner_id: Option<Id>) -> Result<Vec<E>> {
  decode_rows(
    conn,
    "SELECT body FROM records WHERE kind = ?1 AND owner_id IS ?2 ORDER BY seq",
    rusqlite::params![E::KIND.as_ref(), owner_id],
  )
}

fn fetch<E: Entity>(conn: &Connection, id: Id) -> Result<Option<E>> {
  let body: Option<String> = conn
    .query_row(
      "SELECT body FROM records WHERE kind = ?1 AND id = ?2",
      rusqlite::params![E::KIND.as_ref(), id],
      |row| row.get(0),
    )
    .optional()?;
  body.as_deref().map(decode_body).transpose()
}

/// Reject a row whose owner is missing, then let it settle against its
/// siblings. Returns the siblings that must be rewritten.
fn place<E: Entity>(conn: &Connection, row: &mut E, previous: Option<&E>) -> Result<Vec<E>> {
  if let (Some(ownership), Some(owner_id)) = (E::KIND.ownership(), row.owner_id()) {
    let owner = EntityRef::new(ownership.parent, owner_id);
    if !exists(conn, owner)? {
      return Err(academy_core::Error::DanglingReference(owner).into());
    }
  }
  let siblings: Vec<E> = owned::<E>(conn, row.owner_id())?
    .into_iter()
    .filter(|s| s.id() != row.id())
    .collect();
  Ok(row.arrange(previous, &siblings)?)
}

fn put<E: Entity>(conn: &Connection, row: &E) -> Result<()> {
  conn.execute(
    "INSERT INTO records (kind, id, owner_id, body) VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![E::KIND.as_ref(), row.id(), row.owner_id(), encode_body(row)?],
  )?;
  Ok(())
}

fn replace<E: Entity>(conn: &Connection, row: &E) -> Result<()> {
  conn.execute(
    "UPDATE records SET owner_id = ?3, body = ?4 WHERE kind = ?1 AND id = ?2",
    rusqlite::params![E::KIND.as_ref(), row.id(), row.owner_id(), encode_body(row)?],
  )?;
  Ok(())
}

fn put_all<E: Entity>(conn: &Connection, rows: &[E]) -> Result<()> {
  rows.iter().try_for_each(|row| put(conn, row))
}

// ─── Deletes ─────────────────────────────────────────────────────────────────

fn dependents(conn: &Connection, target: EntityRef) -> Result<Vec<(EntityRef, OnDelete)>> {
  let mut found = Vec::new();
  for (kind, ownership) in target.kind.children() {
    let mut stmt =
      conn.prepare("SELECT id FROM records WHERE kind = ?1 AND owner_id = ?2 ORDER BY seq")?;
    let ids = stmt
      .query_map(rusqlite::params![kind.as_ref(), target.id], |row| row.get::<_, Id>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    found.extend(
      ids
        .into_iter()
        .map(|id| (EntityRef::new(kind, id), ownership.on_delete)),
    );
  }
  Ok(found)
}

fn detach(conn: &Connection, target: EntityRef) -> Result<()> {
  let Some(ownership) = target.kind.ownership() else {
    return Ok(());
  };
  conn.execute(
    "UPDATE records SET owner_id = NULL, body = json_set(body, ?3, NULL)
     WHERE kind = ?1 AND id = ?2",
    rusqlite::params![target.kind.as_ref(), target.id, format!("$.{}", ownership.field)],
  )?;
  Ok(())
}

fn delete(conn: &Connection, target: EntityRef) -> Result<()> {
  conn.execute(
    "DELETE FROM records WHERE kind = ?1 AND id = ?2",
    rusqlite::params![target.kind.as_ref(), target.id],
  )?;
  for kind in LinkKind::iter() {
    let (left, right) = kind.ends();
    if left == target.kind {
      conn.execute(
        "DELETE FROM links WHERE kind = ?1 AND left_id = ?2",
        rusqlite::params![kind.as_ref(), target.id],
      )?;
    }
    if right == target.kind {
      conn.execute(
        "DELETE FROM links WHERE kind = ?1 AND right_id = ?2",
        rusqlite::params![kind.as_ref(), target.id],
      )?;
    }
  }
  Ok(())
}

fn remove(conn: &Connection, target: EntityRef, policy: DeletePolicy) -> Result<DeleteOutcome> {
  if !exists(conn, target)? {
    return Ok(DeleteOutcome::NotFound);
  }

  let direct = dependents(conn, target)?;
  if !direct.is_empty() && policy == DeletePolicy::Restrict {
    return Ok(DeleteOutcome::blocked(
      target,
      direct.into_iter().map(|(r, _)| r).collect(),
    ));
  }

  // `removed` doubles as the work queue of the cascade.
  let mut removed = vec![target];
  let mut detached = Vec::new();
  let mut next = 0;
  while let Some(&current) = removed.get(next) {
    for (child, rule) in dependents(conn, current)? {
      match rule {
        OnDelete::Remove => removed.push(child),
        OnDelete::Detach => detached.push(child),
      }
    }
    next += 1;
  }

  let compact = match target.kind {
    EntityKind::CurriculumItem => fetch::<CurriculumItem>(conn, target.id)?.map(|i| i.module_id),
    _ => None,
  };

  for r in &detached {
    detach(conn, *r)?;
  }
  for r in &removed {
    delete(conn, *r)?;
  }
  if let Some(module_id) = compact {
    compact_positions(conn, module_id)?;
  }

  let affected: Vec<EntityRef> = removed.into_iter().skip(1).chain(detached).collect();
  Ok(if affected.is_empty() {
    DeleteOutcome::Deleted
  } else {
    DeleteOutcome::CascadedDeleted { affected }
  })
}

// ─── Curriculum ordering ─────────────────────────────────────────────────────

/// Renumber a module's items 1..=n in their current order.
fn compact_positions(conn: &Connection, module_id: Id) -> Result<()> {
  let mut items = owned::<CurriculumItem>(conn, Some(module_id))?;
  items.sort_by_key(|i| i.position);
  for (n, mut item) in (1..).zip(items) {
    if item.position != n {
      item.position = n;
      replace(conn, &item)?;
    }
  }
  Ok(())
}

fn move_item(conn: &Connection, item_id: Id, direction: Direction) -> Result<bool> {
  let Some(mut item) = fetch::<CurriculumItem>(conn, item_id)? else {
    return Ok(false);
  };
  let neighbor = owned::<CurriculumItem>(conn, Some(item.module_id))?
    .into_iter()
    .filter(|i| match direction {
      Direction::Up => i.position < item.position,
      Direction::Down => i.position > item.position,
    })
    .min_by_key(|i| i.position.abs_diff(item.position));
  let Some(mut neighbor) = neighbor else {
    return Ok(false);
  };
  std::mem::swap(&mut item.position, &mut neighbor.position);
  replace(conn, &item)?;
  replace(conn, &neighbor)?;
  Ok(true)
}

// ─── Links ───────────────────────────────────────────────────────────────────

fn select_links(conn: &Connection, kind: LinkKind, end: LinkEnd) -> Result<Vec<Link>> {
  let (column, id) = match end {
    LinkEnd::Left(id) => ("left_id", Some(id)),
    LinkEnd::Right(id) => ("right_id", Some(id)),
    LinkEnd::All => ("left_id", None),
  };
  let sql = format!(
    "SELECT {} FROM links WHERE kind = ?1 AND (?2 IS NULL OR {column} = ?2) ORDER BY seq",
    RawLink::COLUMNS
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(rusqlite::params![kind.as_ref(), id], RawLink::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawLink::into_link).collect()
}

fn all_links(conn: &Connection) -> Result<Vec<Link>> {
  let sql = format!("SELECT {} FROM links ORDER BY seq", RawLink::COLUMNS);
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map([], RawLink::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawLink::into_link).collect()
}

fn linked(conn: &Connection, kind: LinkKind, left: Id, right: Id) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM links WHERE kind = ?1 AND left_id = ?2 AND right_id = ?3",
        rusqlite::params![kind.as_ref(), left, right],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn put_link(conn: &Connection, link: &Link) -> Result<()> {
  conn.execute(
    "INSERT INTO links (kind, left_id, right_id, is_default, progress, linked_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      link.kind.as_ref(),
      link.left_id,
      link.right_id,
      link.is_default,
      link.progress,
      link.linked_at.map(encode_dt),
    ],
  )?;
  Ok(())
}

// ─── AcademyStore impl ───────────────────────────────────────────────────────

impl AcademyStore for SqliteStore {
  type Error = Error;

  // ── Entities ──────────────────────────────────────────────────────────────

  async fn insert<E: Entity>(&self, draft: E::Draft) -> Result<E> {
    draft.validate()?;
    let row = self
      .write(move |conn| {
        let ids: Vec<Id> = rows::<E>(conn)?.iter().map(Entity::id).collect();
        let mut row = E::build(next_id(ids), draft);
        place(conn, &mut row, None)?;
        put(conn, &row)?;
        Ok(row)
      })
      .await?;
    debug!(entity = %row.entity_ref(), "inserted");
    Ok(row)
  }

  async fn get<E: Entity>(&self, id: Id) -> Result<Option<E>> {
    self.read(move |conn| fetch(conn, id)).await
  }

  async fn list<E: Entity>(&self) -> Result<Vec<E>> { self.read(rows::<E>).await }

  async fn children<E: Entity>(&self, owner_id: Id) -> Result<Vec<E>> {
    self.read(move |conn| owned(conn, Some(owner_id))).await
  }

  async fn update<E: Entity>(&self, id: Id, draft: E::Draft) -> Result<Option<E>> {
    let updated = self
      .write(move |conn| {
        let Some(previous) = fetch::<E>(conn, id)? else {
          return Ok(None);
        };
        draft.validate()?;
        let mut row = E::build(id, draft);
        let shifted = place(conn, &mut row, Some(&previous))?;
        replace(conn, &row)?;
        for sibling in &shifted {
          replace(conn, sibling)?;
        }
        if E::KIND == EntityKind::CurriculumItem && previous.owner_id() != row.owner_id() {
          if let Some(module_id) = previous.owner_id() {
            compact_positions(conn, module_id)?;
          }
        }
        Ok(Some(row))
      })
      .await?;
    if let Some(row) = &updated {
      debug!(entity = %row.entity_ref(), "updated");
    }
    Ok(updated)
  }

  async fn remove<E: Entity>(&self, id: Id, policy: DeletePolicy) -> Result<DeleteOutcome> {
    let target = EntityRef::new(E::KIND, id);
    let outcome = self.write(move |conn| remove(conn, target, policy)).await?;
    match &outcome {
      DeleteOutcome::Blocked { reason, .. } => warn!(%target, %reason, "delete blocked"),
      DeleteOutcome::NotFound => {}
      _ => debug!(%target, "removed"),
    }
    Ok(outcome)
  }

  // ── Links ─────────────────────────────────────────────────────────────────

  async fn link(&self, link: NewLink) -> Result<Option<Link>> {
    let link = link.into_link(Utc::now());
    self
      .write(move |conn| {
        for end in [link.left(), link.right()] {
          if !exists(conn, end)? {
            return Err(academy_core::Error::DanglingReference(end).into());
          }
        }
        if linked(conn, link.kind, link.left_id, link.right_id)? {
          return Ok(None);
        }
        put_link(conn, &link)?;
        debug!(kind = %link.kind, left = link.left_id, right = link.right_id, "linked");
        Ok(Some(link))
      })
      .await
  }

  async fn unlink(&self, kind: LinkKind, left: Id, right: Id) -> Result<bool> {
    self
      .write(move |conn| {
        let n = conn.execute(
          "DELETE FROM links WHERE kind = ?1 AND left_id = ?2 AND right_id = ?3",
          rusqlite::params![kind.as_ref(), left, right],
        )?;
        Ok(n > 0)
      })
      .await
  }

  async fn links(&self, kind: LinkKind, end: LinkEnd) -> Result<Vec<Link>> {
    self.read(move |conn| select_links(conn, kind, end)).await
  }

  async fn set_default(
    &self,
    kind:       LinkKind,
    left:       Id,
    right:      Id,
    is_default: bool,
  ) -> Result<bool> {
    check_default_kind(kind)?;
    self
      .write(move |conn| {
        let n = conn.execute(
          "UPDATE links SET is_default = ?4 WHERE kind = ?1 AND left_id = ?2 AND right_id = ?3",
          rusqlite::params![kind.as_ref(), left, right, is_default],
        )?;
        Ok(n > 0)
      })
      .await
  }

  async fn set_progress(&self, student_id: Id, program_id: Id, progress: u8) -> Result<bool> {
    let progress = progress.min(100);
    self
      .write(move |conn| {
        let n = conn.execute(
          "UPDATE links SET progress = ?4 WHERE kind = ?1 AND left_id = ?2 AND right_id = ?3",
          rusqlite::params![LinkKind::Enrollment.as_ref(), student_id, program_id, progress],
        )?;
        Ok(n > 0)
      })
      .await
  }

  // ── Curriculum ordering ───────────────────────────────────────────────────

  async fn move_item(&self, item_id: Id, direction: Direction) -> Result<bool> {
    self.write(move |conn| move_item(conn, item_id, direction)).await
  }

  // ── Whole-store ───────────────────────────────────────────────────────────

  async fn snapshot(&self) -> Result<Dataset> {
    self
      .read(|conn| {
        Ok(Dataset {
          students: rows(conn)?,
          parents: rows(conn)?,
          organizations: rows(conn)?,
          programs: rows(conn)?,
          modules: rows(conn)?,
          curriculum_items: rows(conn)?,
          achievements: rows(conn)?,
          links: all_links(conn)?,
        })
      })
      .await
  }

  async fn restore(&self, data: Dataset) -> Result<()> {
    self
      .write(move |conn| {
        conn.execute_batch("DELETE FROM records; DELETE FROM links;")?;
        put_all::<Student>(conn, &data.students)?;
        put_all::<Parent>(conn, &data.parents)?;
        put_all::<Organization>(conn, &data.organizations)?;
        put_all::<Program>(conn, &data.programs)?;
        put_all::<Module>(conn, &data.modules)?;
        put_all::<CurriculumItem>(conn, &data.curriculum_items)?;
        put_all::<Achievement>(conn, &data.achievements)?;
        data.links.iter().try_for_each(|link| put_link(conn, link))
      })
      .await
  }
}
