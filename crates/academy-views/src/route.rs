//! Page routes, parsed from and printed to their path form.

use std::{fmt, str::FromStr};

use academy_core::{EntityKind, EntityRef, Id};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
  #[error("no page at {0:?}")]
  UnknownPath(String),

  #[error("{0:?} is not a collection")]
  UnknownCollection(String),

  #[error("{0:?} is not a valid id")]
  InvalidId(String),

  #[error("unexpected query {0:?}")]
  UnexpectedQuery(String),
}

/// A page in the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
  /// `/`
  Dashboard,
  /// `/{collection}`
  List(EntityKind),
  /// `/{collection}/new`
  New(EntityKind),
  /// `/modules/new?programId=N`
  NewModule { program_id: Id },
  /// `/modules/{id}/curriculum/new`
  NewCurriculum { module_id: Id },
  /// `/{collection}/{id}`
  Detail(EntityRef),
  /// `/{collection}/{id}/edit`
  Edit(EntityRef),
}

impl Route {
  pub fn detail(kind: EntityKind, id: Id) -> Self { Self::Detail(EntityRef::new(kind, id)) }
}

impl fmt::Display for Route {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Dashboard => f.write_str("/"),
      Self::List(kind) => write!(f, "/{}", kind.collection()),
      Self::New(kind) => write!(f, "/{}/new", kind.collection()),
      Self::NewModule { program_id } => write!(f, "/modules/new?programId={program_id}"),
      Self::NewCurriculum { module_id } => write!(f, "/modules/{module_id}/curriculum/new"),
      Self::Detail(r) => write!(f, "/{}/{}", r.kind.collection(), r.id),
      Self::Edit(r) => write!(f, "/{}/{}/edit", r.kind.collection(), r.id),
    }
  }
}

fn collection(segment: &str) -> Result<EntityKind, RouteError> {
  EntityKind::from_collection(segment)
    .ok_or_else(|| RouteError::UnknownCollection(segment.to_owned()))
}

fn id(segment: &str) -> Result<Id, RouteError> {
  match segment.parse::<Id>() {
    Ok(id) if id > 0 => Ok(id),
    _ => Err(RouteError::InvalidId(segment.to_owned())),
  }
}

fn program_id(query: &str) -> Result<Id, RouteError> {
  query
    .split('&')
    .find_map(|pair| pair.strip_prefix("programId="))
    .ok_or_else(|| RouteError::UnexpectedQuery(query.to_owned()))
    .and_then(id)
}

impl FromStr for Route {
  type Err = RouteError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (path, query) = match s.split_once('?') {
      Some((path, query)) => (path, Some(query)),
      None => (s, None),
    };
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let route = match segments.as_slice() {
      [] => Self::Dashboard,
      ["modules", "new"] => match query {
        Some(query) if !query.is_empty() => {
          return Ok(Self::NewModule { program_id: program_id(query)? });
        }
        _ => Self::New(EntityKind::Module),
      },
      ["modules", module, "curriculum", "new"] => Self::NewCurriculum { module_id: id(module)? },
      [c] => Self::List(collection(c)?),
      [c, "new"] => Self::New(collection(c)?),
      [c, i] => Self::Detail(EntityRef::new(collection(c)?, id(i)?)),
      [c, i, "edit"] => Self::Edit(EntityRef::new(collection(c)?, id(i)?)),
      _ => return Err(RouteError::UnknownPath(s.to_owned())),
    };
    match query {
      Some(query) if !query.is_empty() => Err(RouteError::UnexpectedQuery(query.to_owned())),
      _ => Ok(route),
    }
  }
}
