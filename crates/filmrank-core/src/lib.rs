//! Core types and relationship logic for Filmrank.
//!
//! This crate has no HTTP or database dependencies. Storage backends
//! implement [`store::EntityStore`] and [`store::EdgeStore`]; the request
//! layer talks to [`RelationshipService`] only.

// Trait methods spell out `impl Future + Send`; impls use plain `async fn`.
#![allow(async_fn_in_trait)]

pub mod engagement;
pub mod error;
pub mod film;
pub mod friendship;
pub mod memory;
pub mod service;
pub mod store;
pub mod user;

pub use error::{Error, ErrorKind, Result};
pub use service::RelationshipService;
