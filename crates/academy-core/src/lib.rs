//! Core types and trait definitions for the Academy administration store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; storage backends implement
//! [`store::AcademyStore`], and the API and view layers are generic over it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod achievement;
pub mod content;
pub mod curriculum;
pub mod dataset;
pub mod entity;
pub mod error;
pub mod fixtures;
pub mod link;
pub mod people;
pub mod program;
pub mod query;
pub mod store;
pub mod validate;
pub mod view;

pub use entity::{Entity, EntityKind, EntityRef, Id};
pub use error::{Error, Result};
