//! [`RelationshipService`], the façade the request layer calls.
//!
//! Every operation resolves the identifiers it is given against the entity
//! store first, so an absent user or film always surfaces as
//! [`Error::UserNotFound`] / [`Error::FilmNotFound`] before any edge is
//! touched. Derived sets are never trusted from storage: relations and likes
//! are recomputed from the edge store on every read, and friendship or like
//! mutations refresh the records the caller passed in.

use std::{collections::BTreeMap, sync::Arc};

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::{
  Error, Result,
  engagement::EngagementLedger,
  film::{Film, FilmId, NewFilm},
  friendship::{FriendshipGraph, RequestOutcome},
  store::{EdgeStore, EntityStore},
  user::{NewUser, User, UserId},
};

pub struct RelationshipService<S> {
  store:  Arc<S>,
  graph:  FriendshipGraph<S>,
  ledger: EngagementLedger<S>,
}

fn today() -> NaiveDate { Utc::now().date_naive() }

impl<S> RelationshipService<S>
where
  S: EntityStore + EdgeStore,
{
  pub fn new(store: Arc<S>) -> Self {
    Self {
      graph: FriendshipGraph::new(Arc::clone(&store)),
      ledger: EngagementLedger::new(Arc::clone(&store)),
      store,
    }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Resolution ────────────────────────────────────────────────────────

  async fn find_user(&self, id: UserId) -> Result<Option<User>> {
    self.store.get_user(id).await.map_err(Error::store)
  }

  async fn find_film(&self, id: FilmId) -> Result<Option<Film>> {
    self.store.get_film(id).await.map_err(Error::store)
  }

  async fn require_user(&self, id: UserId) -> Result<User> {
    self.find_user(id).await?.ok_or(Error::UserNotFound(id))
  }

  async fn require_film(&self, id: FilmId) -> Result<Film> {
    self.find_film(id).await?.ok_or(Error::FilmNotFound(id))
  }

  async fn with_relations(&self, mut user: User) -> Result<User> {
    user.relations = self.graph.relations(user.id).await?;
    Ok(user)
  }

  async fn with_likes(&self, mut film: Film) -> Result<Film> {
    film.likes = self.ledger.likes(film.id).await?;
    Ok(film)
  }

  /// Overwrite the derived sets of caller-held records with the current edge
  /// state.
  async fn refresh_pair(&self, a: &mut User, b: &mut User) -> Result<()> {
    a.relations = self.graph.relations(a.id).await?;
    b.relations = self.graph.relations(b.id).await?;
    Ok(())
  }

  /// Resolve every identifier in order, skipping any that no longer exist.
  async fn resolve_users(&self, ids: impl IntoIterator<Item = UserId>) -> Result<Vec<User>> {
    let mut users = Vec::new();
    for id in ids {
      match self.find_user(id).await? {
        Some(user) => users.push(self.with_relations(user).await?),
        None => debug!(user = %id, "skipping edge to deleted user"),
      }
    }
    Ok(users)
  }

  // ── Users ─────────────────────────────────────────────────────────────

  pub async fn create_user(&self, input: NewUser) -> Result<User> {
    input.validate(today())?;
    let user = self.store.add_user(input).await.map_err(Error::store)?;
    info!(user = %user.id, login = %user.login, "user created");
    Ok(user)
  }

  pub async fn update_user(&self, id: UserId, input: NewUser) -> Result<User> {
    input.validate(today())?;
    let user = self
      .store
      .update_user(id, input)
      .await
      .map_err(Error::store)?
      .ok_or(Error::UserNotFound(id))?;
    info!(user = %id, "user updated");
    self.with_relations(user).await
  }

  /// A user with its relation sets filled in.
  pub async fn user(&self, id: UserId) -> Result<User> {
    let user = self.require_user(id).await?;
    self.with_relations(user).await
  }

  pub async fn users(&self) -> Result<Vec<User>> {
    let users = self.store.list_users().await.map_err(Error::store)?;
    let mut resolved = Vec::with_capacity(users.len());
    for user in users {
      resolved.push(self.with_relations(user).await?);
    }
    Ok(resolved)
  }

  pub async fn delete_user(&self, id: UserId) -> Result<()> {
    if !self.store.delete_user(id).await.map_err(Error::store)? {
      return Err(Error::UserNotFound(id));
    }
    info!(user = %id, "user deleted");
    Ok(())
  }

  // ── Films ─────────────────────────────────────────────────────────────

  pub async fn create_film(&self, input: NewFilm) -> Result<Film> {
    input.validate(today())?;
    let film = self.store.add_film(input).await.map_err(Error::store)?;
    info!(film = %film.id, name = %film.name, "film created");
    Ok(film)
  }

  pub async fn update_film(&self, id: FilmId, input: NewFilm) -> Result<Film> {
    input.validate(today())?;
    let film = self
      .store
      .update_film(id, input)
      .await
      .map_err(Error::store)?
      .ok_or(Error::FilmNotFound(id))?;
    info!(film = %id, "film updated");
    self.with_likes(film).await
  }

  /// A film with its like set filled in.
  pub async fn film(&self, id: FilmId) -> Result<Film> {
    let film = self.require_film(id).await?;
    self.with_likes(film).await
  }

  pub async fn films(&self) -> Result<Vec<Film>> {
    let films = self.store.list_films().await.map_err(Error::store)?;
    let mut resolved = Vec::with_capacity(films.len());
    for film in films {
      resolved.push(self.with_likes(film).await?);
    }
    Ok(resolved)
  }

  pub async fn delete_film(&self, id: FilmId) -> Result<()> {
    if !self.store.delete_film(id).await.map_err(Error::store)? {
      return Err(Error::FilmNotFound(id));
    }
    info!(film = %id, "film deleted");
    Ok(())
  }

  // ── Friendship ────────────────────────────────────────────────────────

  /// `sender` asks `recipient` to be friends. Both records are refreshed on
  /// success.
  pub async fn send_request(
    &self,
    sender: &mut User,
    recipient: &mut User,
  ) -> Result<RequestOutcome> {
    self.require_user(sender.id).await?;
    self.require_user(recipient.id).await?;

    let outcome = self
      .graph
      .send_request(sender.id, recipient.id)
      .await
      .inspect_err(|e| debug!(from = %sender.id, to = %recipient.id, "friend request rejected: {e}"))?;
    info!(from = %sender.id, to = %recipient.id, ?outcome, "friend request sent");

    self.refresh_pair(sender, recipient).await?;
    Ok(outcome)
  }

  /// `accepter` confirms the pending request from `requester`.
  pub async fn accept_request(&self, accepter: &mut User, requester: &mut User) -> Result<()> {
    self.require_user(accepter.id).await?;
    self.require_user(requester.id).await?;

    self
      .graph
      .accept_request(accepter.id, requester.id)
      .await
      .inspect_err(|e| debug!(by = %accepter.id, from = %requester.id, "accept rejected: {e}"))?;
    info!(by = %accepter.id, from = %requester.id, "friend request accepted");

    self.refresh_pair(accepter, requester).await
  }

  pub async fn remove_friend(&self, user: &mut User, other: &mut User) -> Result<()> {
    self.require_user(user.id).await?;
    self.require_user(other.id).await?;

    self
      .graph
      .remove_friend(user.id, other.id)
      .await
      .inspect_err(|e| debug!(user = %user.id, other = %other.id, "unfriend rejected: {e}"))?;
    info!(user = %user.id, other = %other.id, "friendship removed");

    self.refresh_pair(user, other).await
  }

  /// Mutual friends of `id`, identifier ascending.
  pub async fn list_friends(&self, id: UserId) -> Result<Vec<User>> {
    self.require_user(id).await?;
    let friends = self.graph.friends(id).await?;
    self.resolve_users(friends).await
  }

  pub async fn list_common_friends(&self, id: UserId, other: UserId) -> Result<Vec<User>> {
    self.require_user(id).await?;
    self.require_user(other).await?;
    let common = self.graph.common_friends(id, other).await?;
    self.resolve_users(common).await
  }

  // ── Likes ─────────────────────────────────────────────────────────────

  /// Record that `user` likes `film`. Repeating a like is a no-op.
  pub async fn add_like(&self, film: &mut Film, user: UserId) -> Result<()> {
    self.require_film(film.id).await?;
    self.require_user(user).await?;

    if self.ledger.add_like(film.id, user).await? {
      info!(film = %film.id, user = %user, "like added");
    } else {
      debug!(film = %film.id, user = %user, "like already present");
    }
    film.likes = self.ledger.likes(film.id).await?;
    Ok(())
  }

  /// Withdraw a like. Withdrawing an absent like is a no-op.
  pub async fn remove_like(&self, film: &mut Film, user: UserId) -> Result<()> {
    self.require_film(film.id).await?;
    self.require_user(user).await?;

    if self.ledger.remove_like(film.id, user).await? {
      info!(film = %film.id, user = %user, "like removed");
    } else {
      debug!(film = %film.id, user = %user, "no like to remove");
    }
    film.likes = self.ledger.likes(film.id).await?;
    Ok(())
  }

  /// The `limit` most liked films, ties broken by identifier ascending.
  ///
  /// Each film carries the like set it was ranked on.
  pub async fn rank_by_popularity(&self, limit: usize) -> Result<Vec<Film>> {
    let films = self.store.list_films().await.map_err(Error::store)?;
    let ranked = self.ledger.rank(films.iter().map(|f| f.id), limit).await?;

    let mut by_id: BTreeMap<FilmId, Film> =
      films.into_iter().map(|f| (f.id, f)).collect();
    let mut popular = Vec::with_capacity(ranked.len());
    for (id, likes) in ranked {
      if let Some(mut film) = by_id.remove(&id) {
        film.likes = likes;
        popular.push(film);
      }
    }
    Ok(popular)
  }
}
