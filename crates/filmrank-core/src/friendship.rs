//! The friendship graph: directed request edges, mutual friendship derived
//! from reciprocal edges.
//!
//! There is no "accepted" flag. A pair `(a, b)` is mutual exactly when both
//! `a → b` and `b → a` are stored. Requesting is asymmetric, removal is not:
//! removing a friend deletes both directions.
//!
//! Identifiers passed here are assumed to exist; existence checks belong to
//! the [`RelationshipService`](crate::RelationshipService).

use std::{
  collections::{BTreeSet, hash_map::DefaultHasher},
  hash::{Hash, Hasher},
  sync::Arc,
};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
  Error, Result,
  store::{Adjacency, EdgeStore, FriendEdge},
  user::{Relations, UserId},
};

/// Number of lock stripes guarding per-pair critical sections.
const LOCK_STRIPES: usize = 64;

/// The state a pair ends up in after a friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestOutcome {
  /// Only the sender's edge exists; the recipient has not reciprocated.
  Pending,
  /// The recipient had already requested the sender; the pair is now mutual.
  Mutual,
}

pub struct FriendshipGraph<E> {
  edges:   Arc<E>,
  stripes: Box<[Mutex<()>]>,
}

impl<E: EdgeStore> FriendshipGraph<E> {
  pub fn new(edges: Arc<E>) -> Self {
    let stripes = (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect();
    Self { edges, stripes }
  }

  /// The stripe owning the unordered pair `{a, b}`.
  ///
  /// Every check-then-write on a pair runs under its stripe, so two requests
  /// crossing each other cannot both take the "pending" branch.
  fn stripe(&self, a: UserId, b: UserId) -> &Mutex<()> {
    let pair = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = DefaultHasher::new();
    pair.hash(&mut hasher);
    &self.stripes[(hasher.finish() % self.stripes.len() as u64) as usize]
  }

  async fn adjacency(&self, user: UserId) -> Result<Adjacency> {
    self.edges.adjacency(user).await.map_err(Error::store)
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn relations(&self, user: UserId) -> Result<Relations> {
    let adjacency = self.adjacency(user).await?;
    Ok(Relations::from_edges(&adjacency.outgoing, &adjacency.incoming))
  }

  pub async fn friends(&self, user: UserId) -> Result<BTreeSet<UserId>> {
    Ok(self.relations(user).await?.friends)
  }

  pub async fn common_friends(&self, user: UserId, other: UserId) -> Result<BTreeSet<UserId>> {
    let mine = self.friends(user).await?;
    let theirs = self.friends(other).await?;
    Ok(mine.intersection(&theirs).copied().collect())
  }

  // ── Mutations ─────────────────────────────────────────────────────────

  /// Record that `sender` wants to befriend `recipient`.
  ///
  /// If `recipient` had already requested `sender`, both edges are written
  /// together and the pair becomes mutual without a separate accept.
  pub async fn send_request(&self, sender: UserId, recipient: UserId) -> Result<RequestOutcome> {
    if sender == recipient {
      return Err(Error::SelfRequest(sender));
    }

    let _guard = self.stripe(sender, recipient).lock().await;
    let adjacency = self.adjacency(sender).await?;
    let sent = adjacency.outgoing.contains(&recipient);
    let received = adjacency.incoming.contains(&recipient);

    let request = FriendEdge::new(sender, recipient);
    match (sent, received) {
      (true, true) => Err(Error::AlreadyFriends(sender, recipient)),
      (true, false) => Err(Error::RequestExists { from: sender, to: recipient }),
      (false, true) => {
        self
          .edges
          .insert_friend_edges(&[request, request.reversed()])
          .await
          .map_err(Error::store)?;
        Ok(RequestOutcome::Mutual)
      }
      (false, false) => {
        self.edges.insert_friend_edges(&[request]).await.map_err(Error::store)?;
        Ok(RequestOutcome::Pending)
      }
    }
  }

  /// Confirm the pending request `requester → accepter`. The original edge
  /// is kept; the reverse edge is added.
  pub async fn accept_request(&self, accepter: UserId, requester: UserId) -> Result<()> {
    let _guard = self.stripe(accepter, requester).lock().await;
    let adjacency = self.adjacency(accepter).await?;

    if !adjacency.incoming.contains(&requester) {
      return Err(Error::NoPendingRequest { from: requester, to: accepter });
    }
    if adjacency.outgoing.contains(&requester) {
      return Err(Error::AlreadyFriends(accepter, requester));
    }

    self
      .edges
      .insert_friend_edges(&[FriendEdge::new(accepter, requester)])
      .await
      .map_err(Error::store)
  }

  /// Sever a mutual friendship, deleting both edges at once. A one-sided
  /// pending request is not a friendship and is left alone.
  pub async fn remove_friend(&self, user: UserId, other: UserId) -> Result<()> {
    let _guard = self.stripe(user, other).lock().await;
    let adjacency = self.adjacency(user).await?;

    if !(adjacency.outgoing.contains(&other) && adjacency.incoming.contains(&other)) {
      return Err(Error::NotFriends(user, other));
    }

    let edge = FriendEdge::new(user, other);
    self
      .edges
      .remove_friend_edges(&[edge, edge.reversed()])
      .await
      .map_err(Error::store)
  }
}
