//! Users and their derived friendship sets.
//!
//! A user record as stored holds only profile fields. The three relationship
//! sets are never persisted: they are computed from the friendship edge table
//! whenever a user is resolved.

use std::{collections::BTreeSet, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Store-assigned user identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Relations ───────────────────────────────────────────────────────────────

/// The friendship state of one user, derived from directed request edges.
///
/// `friends` holds users with edges in both directions. The two request sets
/// never overlap with `friends`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relations {
  pub friends:           BTreeSet<UserId>,
  pub outgoing_requests: BTreeSet<UserId>,
  pub incoming_requests: BTreeSet<UserId>,
}

impl Relations {
  /// Derive the three sets from the targets of a user's outgoing edges and
  /// the sources of its incoming edges.
  pub fn from_edges(outgoing: &BTreeSet<UserId>, incoming: &BTreeSet<UserId>) -> Self {
    let friends: BTreeSet<UserId> = outgoing.intersection(incoming).copied().collect();
    Self {
      outgoing_requests: outgoing.difference(&friends).copied().collect(),
      incoming_requests: incoming.difference(&friends).copied().collect(),
      friends,
    }
  }

  pub fn is_friend(&self, other: UserId) -> bool { self.friends.contains(&other) }
}

// ─── User ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:        UserId,
  pub email:     String,
  pub login:     String,
  pub name:      String,
  pub birthday:  NaiveDate,
  #[serde(flatten)]
  pub relations: Relations,
}

impl User {
  /// Build a stored record from creation input. Relations start empty.
  pub fn from_new(id: UserId, input: NewUser) -> Self {
    let name = input.display_name().to_owned();
    Self {
      id,
      email: input.email,
      login: input.login,
      name,
      birthday: input.birthday,
      relations: Relations::default(),
    }
  }
}

// ─── NewUser ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::EntityStore::add_user`] and `update_user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
  pub email:    String,
  pub login:    String,
  /// Display name; the login is used when absent or blank.
  #[serde(default)]
  pub name:     Option<String>,
  pub birthday: NaiveDate,
}

impl NewUser {
  pub fn new(email: impl Into<String>, login: impl Into<String>, birthday: NaiveDate) -> Self {
    Self { email: email.into(), login: login.into(), name: None, birthday }
  }

  pub fn display_name(&self) -> &str {
    match self.name.as_deref() {
      Some(name) if !name.trim().is_empty() => name,
      _ => &self.login,
    }
  }

  /// Check field constraints against the current date.
  pub fn validate(&self, today: NaiveDate) -> Result<()> {
    if self.email.trim().is_empty() || !self.email.contains('@') {
      return Err(Error::Invalid("email must be non-empty and contain '@'".into()));
    }
    if self.login.is_empty() || self.login.chars().any(char::is_whitespace) {
      return Err(Error::Invalid("login must be non-empty and contain no whitespace".into()));
    }
    if self.birthday > today {
      return Err(Error::Invalid("birthday cannot be in the future".into()));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ids(raw: &[i64]) -> BTreeSet<UserId> { raw.iter().copied().map(UserId).collect() }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

  #[test]
  fn relations_split_mutual_from_pending() {
    let rel = Relations::from_edges(&ids(&[2, 3, 4]), &ids(&[3, 5]));
    assert_eq!(rel.friends, ids(&[3]));
    assert_eq!(rel.outgoing_requests, ids(&[2, 4]));
    assert_eq!(rel.incoming_requests, ids(&[5]));
    assert!(rel.is_friend(UserId(3)));
    assert!(!rel.is_friend(UserId(2)));
  }

  #[test]
  fn blank_name_falls_back_to_login() {
    let mut input = NewUser::new("a@example.com", "alice", date(1990, 1, 1));
    assert_eq!(input.display_name(), "alice");
    input.name = Some("   ".into());
    assert_eq!(input.display_name(), "alice");
    input.name = Some("Alice".into());
    assert_eq!(User::from_new(UserId(1), input).name, "Alice");
  }

  #[test]
  fn validate_rejects_bad_fields() {
    let today = date(2024, 6, 1);
    let ok = NewUser::new("a@example.com", "alice", date(1990, 1, 1));
    assert!(ok.validate(today).is_ok());

    let mut bad = ok.clone();
    bad.email = "no-at-sign".into();
    assert!(matches!(bad.validate(today), Err(Error::Invalid(_))));

    let mut bad = ok.clone();
    bad.login = "has space".into();
    assert!(matches!(bad.validate(today), Err(Error::Invalid(_))));

    let mut bad = ok;
    bad.birthday = date(2030, 1, 1);
    assert!(matches!(bad.validate(today), Err(Error::Invalid(_))));
  }

  #[test]
  fn relations_are_flattened_into_user_json() {
    let mut user = User::from_new(
      UserId(7),
      NewUser::new("a@example.com", "alice", date(1990, 1, 1)),
    );
    user.relations.friends.insert(UserId(8));

    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["friends"], serde_json::json!([8]));
    assert_eq!(json["outgoing_requests"], serde_json::json!([]));
  }
}
