//! The engagement ledger: which users like which films, and the popularity
//! ranking derived from it.
//!
//! Adding a like that is already present and removing one that is absent are
//! both no-ops rather than errors.

use std::{collections::BTreeSet, sync::Arc};

use crate::{Error, Result, film::FilmId, store::EdgeStore, user::UserId};

pub struct EngagementLedger<E> {
  edges: Arc<E>,
}

impl<E: EdgeStore> EngagementLedger<E> {
  pub fn new(edges: Arc<E>) -> Self { Self { edges } }

  pub async fn likes(&self, film: FilmId) -> Result<BTreeSet<UserId>> {
    self.edges.likes(film).await.map_err(Error::store)
  }

  /// Returns `true` if the like is new.
  pub async fn add_like(&self, film: FilmId, user: UserId) -> Result<bool> {
    self.edges.insert_like(film, user).await.map_err(Error::store)
  }

  /// Returns `true` if a like was actually removed.
  pub async fn remove_like(&self, film: FilmId, user: UserId) -> Result<bool> {
    self.edges.remove_like(film, user).await.map_err(Error::store)
  }

  /// Rank `films` by descending like count, breaking ties by identifier
  /// ascending, and keep the first `limit`.
  ///
  /// Each film comes back with the like set it was ranked on, all read from a
  /// single snapshot. Films without likes take part with an empty set.
  pub async fn rank(
    &self,
    films: impl IntoIterator<Item = FilmId>,
    limit: usize,
  ) -> Result<Vec<(FilmId, BTreeSet<UserId>)>> {
    if limit == 0 {
      return Ok(Vec::new());
    }

    let mut sets = self.edges.like_sets().await.map_err(Error::store)?;
    let mut ranked: Vec<(FilmId, BTreeSet<UserId>)> = films
      .into_iter()
      .map(|id| (id, sets.remove(&id).unwrap_or_default()))
      .collect();

    ranked.sort_by(|(a_id, a_likes), (b_id, b_likes)| {
      b_likes.len().cmp(&a_likes.len()).then(a_id.cmp(b_id))
    });
    ranked.truncate(limit);
    Ok(ranked)
  }
}
