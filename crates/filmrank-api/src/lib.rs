//! JSON REST API for filmrank.
//!
//! Exposes an axum [`Router`] over a [`RelationshipService`] backed by any
//! store implementing both [`EntityStore`] and [`EdgeStore`]. Auth, TLS, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(filmrank_api::api_router(service.clone()))
//! ```

pub mod error;
pub mod films;
pub mod friends;
pub mod likes;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use filmrank_core::{
  RelationshipService,
  store::{EdgeStore, EntityStore},
};

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: Arc<RelationshipService<S>>) -> Router<()>
where
  S: EntityStore + EdgeStore + 'static,
{
  Router::new()
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>).put(users::update::<S>).delete(users::delete::<S>),
    )
    // Friendship
    .route("/users/{id}/friends", get(friends::list::<S>))
    .route(
      "/users/{id}/friends/{other}",
      put(friends::request::<S>).delete(friends::remove::<S>),
    )
    .route("/users/{id}/friends/{other}/accept", post(friends::accept::<S>))
    .route("/users/{id}/friends/common/{other}", get(friends::common::<S>))
    // Films
    .route("/films", get(films::list::<S>).post(films::create::<S>))
    .route("/films/popular", get(likes::popular::<S>))
    .route(
      "/films/{id}",
      get(films::get_one::<S>).put(films::update::<S>).delete(films::delete::<S>),
    )
    // Likes
    .route("/films/{id}/like/{user}", put(likes::add::<S>).delete(likes::remove::<S>))
    .with_state(service)
}

#[cfg(test)]
mod tests;
