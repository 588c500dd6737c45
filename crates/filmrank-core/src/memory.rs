//! [`MemoryStore`]: an in-process implementation of both storage traits.
//!
//! Used by tests and by servers configured without a database. Entities and
//! each edge relation sit behind their own [`RwLock`]; no guard is ever held
//! across an `.await`, and every trait method takes exactly one guard per
//! table it touches, which makes multi-edge writes atomic for readers.

use std::{
  collections::{BTreeMap, BTreeSet},
  convert::Infallible,
  sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
  film::{Film, FilmId, NewFilm},
  store::{Adjacency, EdgeStore, EntityStore, FriendEdge},
  user::{NewUser, User, UserId},
};

type Result<T> = std::result::Result<T, Infallible>;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
  lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
  lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Rows keyed by identifier plus a monotonic identifier sequence.
struct Table<K, V> {
  last_id: i64,
  rows:    BTreeMap<K, V>,
}

impl<K, V> Default for Table<K, V> {
  fn default() -> Self { Self { last_id: 0, rows: BTreeMap::new() } }
}

impl<K: Ord, V> Table<K, V> {
  fn next_id(&mut self) -> i64 {
    self.last_id += 1;
    self.last_id
  }
}

#[derive(Default)]
struct FriendTable {
  outgoing: BTreeMap<UserId, BTreeSet<UserId>>,
  incoming: BTreeMap<UserId, BTreeSet<UserId>>,
}

impl FriendTable {
  fn insert(&mut self, edge: FriendEdge) {
    self.outgoing.entry(edge.from).or_default().insert(edge.to);
    self.incoming.entry(edge.to).or_default().insert(edge.from);
  }

  fn remove(&mut self, edge: FriendEdge) {
    unlink(&mut self.outgoing, edge.from, edge.to);
    unlink(&mut self.incoming, edge.to, edge.from);
  }
}

/// Remove `value` from the set under `key`, dropping the key once it is empty.
fn unlink(map: &mut BTreeMap<UserId, BTreeSet<UserId>>, key: UserId, value: UserId) {
  if let Some(set) = map.get_mut(&key) {
    set.remove(&value);
    if set.is_empty() {
      map.remove(&key);
    }
  }
}

/// A store that lives and dies with the process.
#[derive(Default)]
pub struct MemoryStore {
  users:   RwLock<Table<UserId, User>>,
  films:   RwLock<Table<FilmId, Film>>,
  friends: RwLock<FriendTable>,
  likes:   RwLock<BTreeMap<FilmId, BTreeSet<UserId>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

// ─── EntityStore impl ────────────────────────────────────────────────────────

impl EntityStore for MemoryStore {
  type Error = Infallible;

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let mut users = write(&self.users);
    let user = User::from_new(UserId(users.next_id()), input);
    users.rows.insert(user.id, user.clone());
    Ok(user)
  }

  async fn update_user(&self, id: UserId, input: NewUser) -> Result<Option<User>> {
    let mut users = write(&self.users);
    Ok(users.rows.get_mut(&id).map(|row| {
      *row = User::from_new(id, input);
      row.clone()
    }))
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    Ok(read(&self.users).rows.get(&id).cloned())
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    Ok(read(&self.users).rows.values().cloned().collect())
  }

  async fn delete_user(&self, id: UserId) -> Result<bool> {
    Ok(write(&self.users).rows.remove(&id).is_some())
  }

  async fn add_film(&self, input: NewFilm) -> Result<Film> {
    let mut films = write(&self.films);
    let film = Film::from_new(FilmId(films.next_id()), input);
    films.rows.insert(film.id, film.clone());
    Ok(film)
  }

  async fn update_film(&self, id: FilmId, input: NewFilm) -> Result<Option<Film>> {
    let mut films = write(&self.films);
    Ok(films.rows.get_mut(&id).map(|row| {
      *row = Film::from_new(id, input);
      row.clone()
    }))
  }

  async fn get_film(&self, id: FilmId) -> Result<Option<Film>> {
    Ok(read(&self.films).rows.get(&id).cloned())
  }

  async fn list_films(&self) -> Result<Vec<Film>> {
    Ok(read(&self.films).rows.values().cloned().collect())
  }

  async fn delete_film(&self, id: FilmId) -> Result<bool> {
    Ok(write(&self.films).rows.remove(&id).is_some())
  }
}

// ─── EdgeStore impl ──────────────────────────────────────────────────────────

impl EdgeStore for MemoryStore {
  type Error = Infallible;

  async fn adjacency(&self, user: UserId) -> Result<Adjacency> {
    let friends = read(&self.friends);
    Ok(Adjacency {
      outgoing: friends.outgoing.get(&user).cloned().unwrap_or_default(),
      incoming: friends.incoming.get(&user).cloned().unwrap_or_default(),
    })
  }

  async fn insert_friend_edges(&self, edges: &[FriendEdge]) -> Result<()> {
    let mut friends = write(&self.friends);
    for edge in edges {
      friends.insert(*edge);
    }
    Ok(())
  }

  async fn remove_friend_edges(&self, edges: &[FriendEdge]) -> Result<()> {
    let mut friends = write(&self.friends);
    for edge in edges {
      friends.remove(*edge);
    }
    Ok(())
  }

  async fn likes(&self, film: FilmId) -> Result<BTreeSet<UserId>> {
    Ok(read(&self.likes).get(&film).cloned().unwrap_or_default())
  }

  async fn insert_like(&self, film: FilmId, user: UserId) -> Result<bool> {
    Ok(write(&self.likes).entry(film).or_default().insert(user))
  }

  async fn remove_like(&self, film: FilmId, user: UserId) -> Result<bool> {
    let mut likes = write(&self.likes);
    let removed = likes.get_mut(&film).is_some_and(|users| users.remove(&user));
    if likes.get(&film).is_some_and(BTreeSet::is_empty) {
      likes.remove(&film);
    }
    Ok(removed)
  }

  async fn like_sets(&self) -> Result<BTreeMap<FilmId, BTreeSet<UserId>>> {
    Ok(read(&self.likes).clone())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  };

  use chrono::NaiveDate;

  use super::*;

  fn new_user(login: &str) -> NewUser {
    NewUser::new(
      format!("{login}@example.com"),
      login,
      NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
    )
  }

  #[tokio::test]
  async fn identifiers_are_not_reused_after_delete() {
    let s = MemoryStore::new();
    let first = s.add_user(new_user("alice")).await.unwrap();
    assert!(s.delete_user(first.id).await.unwrap());
    assert!(!s.delete_user(first.id).await.unwrap());

    let second = s.add_user(new_user("bob")).await.unwrap();
    assert!(second.id > first.id);
    assert_eq!(s.list_users().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn update_missing_user_returns_none() {
    let s = MemoryStore::new();
    assert!(s.update_user(UserId(42), new_user("ghost")).await.unwrap().is_none());

    let user = s.add_user(new_user("alice")).await.unwrap();
    let mut input = new_user("alice2");
    input.name = Some("Alice".into());
    let updated = s.update_user(user.id, input).await.unwrap().unwrap();
    assert_eq!(updated.id, user.id);
    assert_eq!(updated.login, "alice2");
    assert_eq!(updated.name, "Alice");
  }

  #[tokio::test]
  async fn adjacency_reflects_both_directions() {
    let s = MemoryStore::new();
    let (a, b, c) = (UserId(1), UserId(2), UserId(3));
    s.insert_friend_edges(&[FriendEdge::new(a, b), FriendEdge::new(c, a)])
      .await
      .unwrap();

    let adj = s.adjacency(a).await.unwrap();
    assert_eq!(adj.outgoing, BTreeSet::from([b]));
    assert_eq!(adj.incoming, BTreeSet::from([c]));

    s.remove_friend_edges(&[FriendEdge::new(a, b), FriendEdge::new(b, a)])
      .await
      .unwrap();
    assert!(s.adjacency(b).await.unwrap().incoming.is_empty());
  }

  #[tokio::test]
  async fn removed_edges_leave_no_empty_entries() {
    let s = MemoryStore::new();
    let (a, b) = (UserId(1), UserId(2));
    let pair = [FriendEdge::new(a, b), FriendEdge::new(b, a)];
    s.insert_friend_edges(&pair).await.unwrap();
    s.remove_friend_edges(&pair).await.unwrap();
    // Removing an absent edge must not create entries either.
    s.remove_friend_edges(&[FriendEdge::new(a, UserId(3))]).await.unwrap();

    let friends = read(&s.friends);
    assert!(friends.outgoing.is_empty());
    assert!(friends.incoming.is_empty());
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
  async fn pair_writes_are_never_seen_half_done() {
    let s = Arc::new(MemoryStore::new());
    let (a, b) = (UserId(1), UserId(2));
    let insert = [FriendEdge::new(b, a), FriendEdge::new(a, b)];
    let remove = [FriendEdge::new(a, b), FriendEdge::new(b, a)];
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
      let (s, done) = (Arc::clone(&s), Arc::clone(&done));
      tokio::spawn(async move {
        loop {
          let adj = s.adjacency(a).await.unwrap();
          assert_eq!(adj.outgoing.contains(&b), adj.incoming.contains(&b), "torn pair: {adj:?}");
          if done.load(Ordering::Acquire) {
            break;
          }
          tokio::task::yield_now().await;
        }
      })
    };

    for _ in 0..1000 {
      s.insert_friend_edges(&insert).await.unwrap();
      tokio::task::yield_now().await;
      s.remove_friend_edges(&remove).await.unwrap();
      tokio::task::yield_now().await;
    }
    done.store(true, Ordering::Release);
    reader.await.unwrap();
  }

  #[tokio::test]
  async fn like_sets_drop_empty_films() {
    let s = MemoryStore::new();
    s.insert_like(FilmId(1), UserId(1)).await.unwrap();
    s.insert_like(FilmId(1), UserId(2)).await.unwrap();
    s.insert_like(FilmId(2), UserId(1)).await.unwrap();
    s.remove_like(FilmId(2), UserId(1)).await.unwrap();

    let sets = s.like_sets().await.unwrap();
    assert_eq!(sets, BTreeMap::from([(FilmId(1), BTreeSet::from([UserId(1), UserId(2)]))]));
  }
}
