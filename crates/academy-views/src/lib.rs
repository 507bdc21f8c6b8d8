//! View models for the Academy back office.
//!
//! Each type here holds the state a page would hold (the rows a list shows,
//! the draft a form edits, the pending delete awaiting confirmation) and the
//! transitions between those states. Nothing is rendered; every model reads
//! and writes through an injected [`academy_core::store::AcademyStore`].

pub mod confirm;
pub mod form;
pub mod list;
pub mod route;
pub mod selector;
pub mod task;

pub use confirm::ConfirmDelete;
pub use form::{Form, FormTarget, ReturnTo, SubmitError};
pub use list::{ListState, ListView};
pub use route::{Route, RouteError};
pub use selector::{AttachError, Selector};
pub use task::{TaskState, UploadFile, UploadTask};
