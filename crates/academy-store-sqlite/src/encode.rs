//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, entity bodies as compact JSON,
//! enum discriminants as their snake_case names.

use std::str::FromStr as _;

use academy_core::{
  Entity,
  link::{Link, LinkKind},
};
use chrono::{DateTime, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── Entities ────────────────────────────────────────────────────────────────

pub fn encode_body<E: Entity>(row: &E) -> Result<String> { Ok(serde_json::to_string(row)?) }

pub fn decode_body<E: Entity>(s: &str) -> Result<E> { Ok(serde_json::from_str(s)?) }

// ─── Links ───────────────────────────────────────────────────────────────────

pub fn decode_link_kind(s: &str) -> Result<LinkKind> {
  LinkKind::from_str(s).map_err(|_| Error::Decode(format!("unknown link kind: {s:?}")))
}

/// Raw values read directly from a `links` row.
pub struct RawLink {
  pub kind:       String,
  pub left_id:    u32,
  pub right_id:   u32,
  pub is_default: bool,
  pub progress:   u8,
  pub linked_at:  Option<String>,
}

impl RawLink {
  pub const COLUMNS: &'static str = "kind, left_id, right_id, is_default, progress, linked_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      kind:       row.get(0)?,
      left_id:    row.get(1)?,
      right_id:   row.get(2)?,
      is_default: row.get(3)?,
      progress:   row.get(4)?,
      linked_at:  row.get(5)?,
    })
  }

  pub fn into_link(self) -> Result<Link> {
    Ok(Link {
      kind:       decode_link_kind(&self.kind)?,
      left_id:    self.left_id,
      right_id:   self.right_id,
      is_default: self.is_default,
      progress:   self.progress,
      linked_at:  self.linked_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}
