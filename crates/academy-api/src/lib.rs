//! JSON REST API for Academy.
//!
//! Exposes an axum [`Router`] backed by any [`academy_core::store::AcademyStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", academy_api::api_router(store.clone()))
//! ```

pub mod details;
pub mod entities;
pub mod error;
pub mod links;
pub mod nested;

use std::sync::Arc;

use academy_core::{
  achievement::Achievement,
  curriculum::CurriculumItem,
  people::{Organization, Parent, Student},
  program::{Module, Program},
  store::AcademyStore,
};
use axum::{
  Router,
  routing::{delete, get, post, put},
};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: AcademyStore + 'static,
{
  use entities::{create, list, remove, update};

  Router::new()
    .route("/dashboard", get(details::dashboard::<S>))
    // Students
    .route("/students", get(list::<S, Student>).post(create::<S, Student>))
    .route(
      "/students/{id}",
      get(details::student::<S>)
        .put(update::<S, Student>)
        .delete(remove::<S, Student>),
    )
    .route(
      "/students/{id}/parents",
      get(links::parents::<S>).post(links::attach_parents::<S>),
    )
    .route("/students/{id}/parents/{pid}", delete(links::detach_parent::<S>))
    .route(
      "/students/{id}/programs",
      get(links::enrollments::<S>).post(links::enroll::<S>),
    )
    .route("/students/{id}/programs/{pid}", delete(links::unenroll::<S>))
    .route("/students/{id}/programs/{pid}/progress", put(links::set_progress::<S>))
    .route(
      "/students/{id}/achievements",
      get(links::earned::<S>).post(links::attach_achievements::<S, Student>),
    )
    .route(
      "/students/{id}/achievements/{aid}",
      delete(links::detach_achievement::<S, Student>),
    )
    // Parents
    .route("/parents", get(list::<S, Parent>).post(create::<S, Parent>))
    .route(
      "/parents/{id}",
      get(details::parent::<S>)
        .put(update::<S, Parent>)
        .delete(remove::<S, Parent>),
    )
    .route("/parents/{id}/students", get(links::children::<S>))
    // Organizations
    .route(
      "/organizations",
      get(list::<S, Organization>).post(create::<S, Organization>),
    )
    .route("/organizations/summaries", get(details::organization_summaries::<S>))
    .route(
      "/organizations/{id}",
      get(details::organization::<S>)
        .put(update::<S, Organization>)
        .delete(remove::<S, Organization>),
    )
    // Programs
    .route("/programs", get(list::<S, Program>).post(create::<S, Program>))
    .route("/programs/summaries", get(details::program_summaries::<S>))
    .route(
      "/programs/{id}",
      get(details::program::<S>)
        .put(update::<S, Program>)
        .delete(remove::<S, Program>),
    )
    .route(
      "/programs/{id}/achievements",
      get(links::achievements::<S, Program>).post(links::attach_achievements::<S, Program>),
    )
    .route(
      "/programs/{id}/achievements/{aid}",
      delete(links::detach_achievement::<S, Program>),
    )
    .route(
      "/programs/{id}/achievements/{aid}/default",
      put(links::set_default::<S, Program>),
    )
    // Modules
    .route("/modules", get(list::<S, Module>).post(nested::create_module::<S>))
    .route(
      "/modules/{id}",
      get(details::module::<S>)
        .put(update::<S, Module>)
        .delete(remove::<S, Module>),
    )
    .route(
      "/modules/{id}/curriculum",
      get(nested::list_curriculum::<S>).post(nested::create_curriculum::<S>),
    )
    .route(
      "/modules/{id}/achievements",
      get(links::achievements::<S, Module>).post(links::attach_achievements::<S, Module>),
    )
    .route(
      "/modules/{id}/achievements/{aid}",
      delete(links::detach_achievement::<S, Module>),
    )
    .route(
      "/modules/{id}/achievements/{aid}/default",
      put(links::set_default::<S, Module>),
    )
    // Curriculum
    .route(
      "/curriculum",
      get(list::<S, CurriculumItem>).post(create::<S, CurriculumItem>),
    )
    .route(
      "/curriculum/{id}",
      get(details::curriculum::<S>)
        .put(update::<S, CurriculumItem>)
        .delete(remove::<S, CurriculumItem>),
    )
    .route("/curriculum/{id}/move", post(nested::move_item::<S>))
    .route(
      "/curriculum/{id}/achievements",
      get(links::achievements::<S, CurriculumItem>)
        .post(links::attach_achievements::<S, CurriculumItem>),
    )
    .route(
      "/curriculum/{id}/achievements/{aid}",
      delete(links::detach_achievement::<S, CurriculumItem>),
    )
    // Achievements
    .route(
      "/achievements",
      get(list::<S, Achievement>).post(create::<S, Achievement>),
    )
    .route(
      "/achievements/{id}",
      get(details::achievement::<S>)
        .put(update::<S, Achievement>)
        .delete(remove::<S, Achievement>),
    )
    .with_state(store)
}

#[cfg(test)]
mod tests;
