//! Create and edit forms.
//!
//! A [`Form`] owns a draft and submits it through the store. Field errors
//! and the banner message stay on the form so a page can show them next to
//! the inputs; on success the form names the page to go to next.

use academy_core::{
  Entity, EntityKind, EntityRef, Error, Id,
  achievement::Achievement,
  curriculum::{ContentRef, CurriculumItem, next_position},
  people::{Organization, Parent, Student},
  program::{Module, Program},
  store::{AcademyStore, StoreError},
  validate::{Validate, ValidationErrors},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{route::Route, task::TaskState};

// ─── Follow-up routes ────────────────────────────────────────────────────────

/// Where a form navigates once a record has been saved.
pub trait FormTarget: Entity {
  fn follow_up(&self) -> Route { Route::List(Self::KIND) }
}

impl FormTarget for Student {}
impl FormTarget for Parent {}
impl FormTarget for Organization {}
impl FormTarget for Program {}
impl FormTarget for Module {}
impl FormTarget for Achievement {}

impl FormTarget for CurriculumItem {
  fn follow_up(&self) -> Route { Route::detail(EntityKind::Module, self.module_id) }
}

/// Which follow-up a form uses once it has saved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReturnTo {
  /// The saved record's own [`FormTarget::follow_up`].
  #[default]
  FollowUp,
  /// The detail page of the saved record's owner, as it was saved.
  Owner,
}

impl ReturnTo {
  fn route<E: FormTarget>(self, record: &E) -> Route {
    let owner = E::KIND
      .ownership()
      .zip(record.owner_id())
      .map(|(ownership, id)| Route::detail(ownership.parent, id));
    match self {
      Self::Owner => owner.unwrap_or_else(|| record.follow_up()),
      Self::FollowUp => record.follow_up(),
    }
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum SubmitError {
  /// The draft failed validation; nothing was written.
  #[error("{0}")]
  Invalid(ValidationErrors),

  /// The store refused the write (unknown reference, taken position).
  #[error("{0}")]
  Rejected(String),

  /// The backend failed.
  #[error("{0}")]
  Failed(String),
}

fn failure_notice(kind: EntityKind) -> String {
  format!("There was a problem saving the {}. Please try again.", kind.noun())
}

// ─── Form ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Form<E: Entity> {
  pub draft:     E::Draft,
  /// The record being edited; `None` for a create form.
  pub editing:   Option<Id>,
  pub errors:    ValidationErrors,
  /// The message shown above the form after a failed submit.
  pub banner:    Option<String>,
  pub state:     TaskState,
  pub return_to: ReturnTo,
}

impl<E: FormTarget> Default for Form<E> {
  fn default() -> Self { Self::create() }
}

impl<E: FormTarget> Form<E> {
  pub fn create() -> Self { Self::with_draft(E::Draft::default()) }

  pub fn with_draft(draft: E::Draft) -> Self {
    Self {
      draft,
      editing: None,
      errors: ValidationErrors::new(),
      banner: None,
      state: TaskState::Idle,
      return_to: ReturnTo::default(),
    }
  }

  pub fn edit(record: &E) -> Self {
    Self { editing: Some(record.id()), ..Self::with_draft(record.to_draft()) }
  }

  /// Open the form a create or edit route names. `None` when the route is
  /// not a form for `E` or the record to edit does not exist.
  pub async fn open<S: AcademyStore>(store: &S, route: &Route) -> Result<Option<Self>, S::Error> {
    match route {
      Route::New(kind) if *kind == E::KIND => Ok(Some(Self::create())),
      Route::Edit(target) if target.kind == E::KIND => {
        Ok(store.get::<E>(target.id).await?.map(|record| Self::edit(&record)))
      }
      _ => Ok(None),
    }
  }

  pub fn is_submitting(&self) -> bool { self.state == TaskState::InFlight }

  fn fail(&mut self, error: SubmitError) -> SubmitError {
    warn!(kind = %E::KIND, editing = ?self.editing, %error, "submit failed");
    let banner = match &error {
      SubmitError::Invalid(errors) => errors.banner().map(str::to_owned),
      other => Some(other.to_string()),
    };
    self.state = TaskState::Failed(banner.clone().unwrap_or_default());
    self.banner = banner;
    error
  }

  /// Validate, then create or update through `store`. Returns the page to
  /// show next.
  pub async fn submit<S: AcademyStore>(&mut self, store: &S) -> Result<Route, SubmitError> {
    self.errors = ValidationErrors::new();
    self.banner = None;
    if let Err(errors) = self.draft.validate() {
      self.errors = errors.clone();
      return Err(self.fail(SubmitError::Invalid(errors)));
    }

    self.state = TaskState::InFlight;
    let draft = self.draft.clone();
    let saved = match self.editing {
      None => store.insert::<E>(draft).await.map(Some),
      Some(id) => store.update::<E>(id, draft).await,
    };

    match saved {
      Ok(Some(record)) => {
        debug!(kind = %E::KIND, id = record.id(), "saved");
        self.state = TaskState::Succeeded;
        self.editing = Some(record.id());
        Ok(self.return_to.route(&record))
      }
      Ok(None) => {
        let missing = EntityRef::new(E::KIND, self.editing.unwrap_or_default());
        Err(self.fail(SubmitError::Rejected(Error::NotFound(missing).to_string())))
      }
      Err(e) => match e.user_error() {
        Some(Error::Validation(errors)) => {
          self.errors = errors.clone();
          Err(self.fail(SubmitError::Invalid(errors.clone())))
        }
        Some(core) => Err(self.fail(SubmitError::Rejected(core.to_string()))),
        None => {
          warn!(kind = %E::KIND, error = %e, "store failure");
          Err(self.fail(SubmitError::Failed(failure_notice(E::KIND))))
        }
      },
    }
  }
}

impl Form<Module> {
  /// Honors `/modules/new?programId=N`: the program is pre-selected and the
  /// form returns to the page of the program the module is saved under.
  pub fn from_route(route: &Route) -> Self {
    match *route {
      Route::NewModule { program_id } => {
        let mut form = Self::create();
        form.draft.program_id = program_id;
        form.return_to = ReturnTo::Owner;
        form
      }
      _ => Self::create(),
    }
  }
}

impl Form<CurriculumItem> {
  /// Honors `/modules/{id}/curriculum/new`: the module is pre-selected and
  /// the position is the next free one.
  pub async fn from_route<S: AcademyStore>(store: &S, route: &Route) -> Result<Self, S::Error> {
    let mut form = Self::create();
    if let Route::NewCurriculum { module_id } = *route {
      let siblings = store.children::<CurriculumItem>(module_id).await?;
      form.draft.module_id = module_id;
      form.draft.position = Some(next_position(&siblings));
    }
    Ok(form)
  }

  /// Use a finished upload as the item's content.
  pub fn attach_upload(&mut self, content: ContentRef) { self.draft.content = Some(content); }
}

#[cfg(test)]
mod tests {
  use academy_core::{
    program::{ProgramDraft, Status},
    query::ListQuery,
  };
  use academy_store_memory::MemoryStore;

  use super::*;
  use crate::{
    list::ListView,
    task::{UploadFile, UploadTask},
  };

  #[tokio::test]
  async fn new_program_appears_with_draft_badge() {
    let store = MemoryStore::fixtures();
    let mut form = Form::<Program>::with_draft(ProgramDraft {
      name: "Test Program".into(),
      ..Default::default()
    });
    assert_eq!(form.submit(&store).await, Ok(Route::List(EntityKind::Program)));
    assert_eq!(form.state, TaskState::Succeeded);
    assert_eq!(form.editing, Some(7));

    let mut list = ListView::<Program>::new(ListQuery::text("Test Program"));
    list.refresh(&store).await.unwrap();
    let [program] = list.rows() else { panic!("expected one row") };
    assert_eq!(program.status, Status::Draft);
    assert_eq!(program.status.to_string(), "draft");
  }

  #[tokio::test]
  async fn empty_student_name_blocks_submission() {
    let store = MemoryStore::fixtures();
    let before = store.snapshot().await.unwrap();
    let mut form = Form::<Student>::create();
    form.draft.email = "new@example.com".into();

    let err = form.submit(&store).await.unwrap_err();
    assert!(matches!(err, SubmitError::Invalid(_)));
    assert_eq!(form.banner.as_deref(), Some("Student name is required"));
    assert_eq!(form.errors.for_field("name"), Some("Student name is required"));
    assert!(matches!(form.state, TaskState::Failed(_)));
    assert_eq!(store.snapshot().await.unwrap(), before);
  }

  #[tokio::test]
  async fn edit_form_updates_in_place() {
    let store = MemoryStore::fixtures();
    let route: Route = "/parents/2/edit".parse().unwrap();
    let mut form = Form::<Parent>::open(&store, &route).await.unwrap().unwrap();
    assert_eq!(form.draft.name, "Jennifer Smith");

    form.draft.phone = "555-000-1111".into();
    assert_eq!(form.submit(&store).await, Ok(Route::List(EntityKind::Parent)));
    let parent = store.get::<Parent>(2).await.unwrap().unwrap();
    assert_eq!(parent.phone, "555-000-1111");
    assert_eq!(store.list::<Parent>().await.unwrap().len(), 7);
  }

  #[tokio::test]
  async fn open_ignores_other_routes() {
    let store = MemoryStore::fixtures();
    let route: Route = "/parents/99/edit".parse().unwrap();
    assert_eq!(Form::<Parent>::open(&store, &route).await.unwrap(), None);
    assert_eq!(Form::<Student>::open(&store, &Route::Dashboard).await.unwrap(), None);
  }

  #[tokio::test]
  async fn module_form_returns_to_its_program() {
    let store = MemoryStore::fixtures();
    let route: Route = "/modules/new?programId=2".parse().unwrap();
    let mut form = Form::<Module>::from_route(&route);
    assert_eq!(form.draft.program_id, 2);

    form.draft.name = "Navigation".into();
    assert_eq!(form.submit(&store).await, Ok(Route::detail(EntityKind::Program, 2)));

    let mut moved = Form::<Module>::from_route(&route);
    moved.draft.name = "Deployment".into();
    moved.draft.program_id = 3;
    assert_eq!(moved.submit(&store).await, Ok(Route::detail(EntityKind::Program, 3)));

    let mut plain = Form::<Module>::from_route(&Route::New(EntityKind::Module));
    plain.draft.name = "Hooks".into();
    plain.draft.program_id = 2;
    assert_eq!(plain.submit(&store).await, Ok(Route::List(EntityKind::Module)));
  }

  #[tokio::test]
  async fn dangling_program_becomes_the_banner() {
    let store = MemoryStore::fixtures();
    let mut form = Form::<Module>::create();
    form.draft.name = "Orphan".into();
    form.draft.program_id = 40;
    let err = form.submit(&store).await.unwrap_err();
    assert_eq!(err, SubmitError::Rejected("referenced program 40 does not exist".into()));
    assert_eq!(form.banner.as_deref(), Some("referenced program 40 does not exist"));
  }

  #[tokio::test(start_paused = true)]
  async fn curriculum_form_with_upload() {
    let store = MemoryStore::fixtures();
    let route: Route = "/modules/2/curriculum/new".parse().unwrap();
    let mut form = Form::<CurriculumItem>::from_route(&store, &route).await.unwrap();
    assert_eq!(form.draft.module_id, 2);
    assert_eq!(form.draft.position, Some(3));

    form.draft.title = "CSS Box Model".into();
    let err = form.submit(&store).await.unwrap_err();
    assert_eq!(form.errors.for_field("content"), Some("Please upload a file or provide a URL"));
    assert!(matches!(err, SubmitError::Invalid(_)));

    let upload = UploadTask::start(UploadFile {
      name:       "box-model.pdf".into(),
      media_type: "application/pdf".into(),
      size:       4096,
    });
    form.attach_upload(upload.finish().await.unwrap());
    assert_eq!(form.submit(&store).await, Ok(Route::detail(EntityKind::Module, 2)));
    assert!(form.errors.is_empty());
    assert_eq!(form.banner, None);
  }
}
