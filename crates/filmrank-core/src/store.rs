//! Storage traits consumed by the relationship core.
//!
//! [`EntityStore`] holds user and film records; [`EdgeStore`] holds the two
//! edge relations. Backends (e.g. `filmrank-store-sqlite`, or the in-process
//! [`MemoryStore`](crate::memory::MemoryStore)) usually implement both on one
//! type. Higher layers depend on these abstractions, not on any backend.

use std::{
  collections::{BTreeMap, BTreeSet},
  future::Future,
};

use crate::{
  film::{Film, FilmId, NewFilm},
  user::{NewUser, User, UserId},
};

// ─── Edge types ──────────────────────────────────────────────────────────────

/// A directed friendship edge: `from` has requested or confirmed `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FriendEdge {
  pub from: UserId,
  pub to:   UserId,
}

impl FriendEdge {
  pub fn new(from: UserId, to: UserId) -> Self { Self { from, to } }

  pub fn reversed(self) -> Self { Self { from: self.to, to: self.from } }
}

/// Both edge directions touching one user, read as a single snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency {
  /// Targets of edges leaving the user.
  pub outgoing: BTreeSet<UserId>,
  /// Sources of edges arriving at the user.
  pub incoming: BTreeSet<UserId>,
}

// ─── Entity store ────────────────────────────────────────────────────────────

/// Keyed persistence for user and film records.
///
/// Records returned from here carry empty derived sets (`relations`,
/// `likes`); the [`RelationshipService`](crate::RelationshipService) fills
/// them from the edge store.
pub trait EntityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user and return it with its assigned identifier.
  /// Identifiers are never reused, even after deletion.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Replace the profile fields of an existing user. Returns `None` if the
  /// user does not exist.
  fn update_user(
    &self,
    id: UserId,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// All users, identifier ascending.
  fn list_users(&self) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Returns `false` if the user did not exist. Edges are left untouched.
  fn delete_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Films ─────────────────────────────────────────────────────────────

  fn add_film(
    &self,
    input: NewFilm,
  ) -> impl Future<Output = Result<Film, Self::Error>> + Send + '_;

  fn update_film(
    &self,
    id: FilmId,
    input: NewFilm,
  ) -> impl Future<Output = Result<Option<Film>, Self::Error>> + Send + '_;

  fn get_film(
    &self,
    id: FilmId,
  ) -> impl Future<Output = Result<Option<Film>, Self::Error>> + Send + '_;

  /// All films, identifier ascending.
  fn list_films(&self) -> impl Future<Output = Result<Vec<Film>, Self::Error>> + Send + '_;

  fn delete_film(
    &self,
    id: FilmId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Edge store ──────────────────────────────────────────────────────────────

/// Persistence for the `friendship(from, to)` and `likes(film, user)`
/// relations.
///
/// Every method is atomic with respect to every other: a multi-edge write is
/// observed by readers either entirely or not at all. Callers are expected to
/// serialise their own check-then-write sequences.
pub trait EdgeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Friendship ────────────────────────────────────────────────────────

  /// Outgoing and incoming edges of `user`, from one consistent snapshot.
  fn adjacency(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<Adjacency, Self::Error>> + Send + '_;

  /// Insert all `edges` in one atomic step. Edges already present are kept.
  fn insert_friend_edges<'a>(
    &'a self,
    edges: &'a [FriendEdge],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete all `edges` in one atomic step. Absent edges are ignored.
  fn remove_friend_edges<'a>(
    &'a self,
    edges: &'a [FriendEdge],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Likes ─────────────────────────────────────────────────────────────

  fn likes(
    &self,
    film: FilmId,
  ) -> impl Future<Output = Result<BTreeSet<UserId>, Self::Error>> + Send + '_;

  /// Returns `true` if the like was not already present.
  fn insert_like(
    &self,
    film: FilmId,
    user: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Returns `true` if a like was removed.
  fn remove_like(
    &self,
    film: FilmId,
    user: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Every film's like set, from one consistent snapshot. Films without likes
  /// are absent.
  fn like_sets(
    &self,
  ) -> impl Future<Output = Result<BTreeMap<FilmId, BTreeSet<UserId>>, Self::Error>> + Send + '_;
}
