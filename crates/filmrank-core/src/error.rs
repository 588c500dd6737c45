//! Error types for `filmrank-core`.

use thiserror::Error;

use crate::{film::FilmId, user::UserId};

/// Coarse classification of an [`Error`], used by the request layer to pick a
/// response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// A referenced entity or relationship does not exist.
  NotFound,
  /// The operation would violate a relationship invariant.
  Conflict,
  /// The input failed field validation.
  Invalid,
  /// The storage backend failed.
  Store,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(UserId),

  #[error("film not found: {0}")]
  FilmNotFound(FilmId),

  #[error("no pending friend request from {from} to {to}")]
  NoPendingRequest { from: UserId, to: UserId },

  #[error("users {0} and {1} are not friends")]
  NotFriends(UserId, UserId),

  #[error("user {0} cannot send a friend request to itself")]
  SelfRequest(UserId),

  #[error("friend request from {from} to {to} already exists")]
  RequestExists { from: UserId, to: UserId },

  #[error("users {0} and {1} are already friends")]
  AlreadyFriends(UserId, UserId),

  #[error("invalid input: {0}")]
  Invalid(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::UserNotFound(_)
      | Self::FilmNotFound(_)
      | Self::NoPendingRequest { .. }
      | Self::NotFriends(..) => ErrorKind::NotFound,
      Self::SelfRequest(_)
      | Self::RequestExists { .. }
      | Self::AlreadyFriends(..) => ErrorKind::Conflict,
      Self::Invalid(_) => ErrorKind::Invalid,
      Self::Store(_) => ErrorKind::Store,
    }
  }

  /// Box a backend error. Usable directly with `map_err`.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
