//! [`SqliteStore`]: the SQLite implementation of [`EntityStore`] and
//! [`EdgeStore`].

use std::{
  collections::{BTreeMap, BTreeSet},
  path::Path,
};

use rusqlite::OptionalExtension as _;
use tracing::debug;

use filmrank_core::{
  film::{Film, FilmId, NewFilm},
  store::{Adjacency, EdgeStore, EntityStore, FriendEdge},
  user::{NewUser, User, UserId},
};

use crate::{
  Result,
  encode::{RawFilm, RawUser, encode_date, encode_genres},
  error::Error,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A filmrank store backed by a single SQLite file.
///
/// Clones share the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    debug!("sqlite schema ready");
    Ok(())
  }
}

/// Column values of a film row, encoded ahead of a write.
struct FilmColumns {
  name:         String,
  description:  String,
  release_date: String,
  duration:     i64,
  mpa:          Option<&'static str>,
  genres:       String,
}

impl FilmColumns {
  fn encode(input: &NewFilm) -> Result<Self> {
    Ok(Self {
      name:         input.name.clone(),
      description:  input.description.clone(),
      release_date: encode_date(input.release_date),
      duration:     i64::from(input.duration),
      mpa:          input.mpa.map(|m| m.as_str()),
      genres:       encode_genres(&input.genres)?,
    })
  }
}

// ─── EntityStore impl ────────────────────────────────────────────────────────

impl EntityStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let name = input.display_name().to_owned();
    let email = input.email.clone();
    let login = input.login.clone();
    let birthday = encode_date(input.birthday);

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (email, login, name, birthday) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![email, login, name, birthday],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(User::from_new(UserId(id), input))
  }

  async fn update_user(&self, id: UserId, input: NewUser) -> Result<Option<User>> {
    let user = User::from_new(id, input);
    let (email, login, name) = (user.email.clone(), user.login.clone(), user.name.clone());
    let birthday = encode_date(user.birthday);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET email = ?2, login = ?3, name = ?4, birthday = ?5 WHERE id = ?1",
          rusqlite::params![id.0, email, login, name, birthday],
        )?)
      })
      .await?;

    Ok((changed > 0).then_some(user))
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", RawUser::COLUMNS),
            rusqlite::params![id.0],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {} FROM users ORDER BY id", RawUser::COLUMNS))?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn delete_user(&self, id: UserId) -> Result<bool> {
    let deleted: usize = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id.0])?))
      .await?;
    Ok(deleted > 0)
  }

  // ── Films ─────────────────────────────────────────────────────────────

  async fn add_film(&self, input: NewFilm) -> Result<Film> {
    let cols = FilmColumns::encode(&input)?;

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO films (name, description, release_date, duration, mpa, genres)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            cols.name,
            cols.description,
            cols.release_date,
            cols.duration,
            cols.mpa,
            cols.genres,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Film::from_new(FilmId(id), input))
  }

  async fn update_film(&self, id: FilmId, input: NewFilm) -> Result<Option<Film>> {
    let cols = FilmColumns::encode(&input)?;

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE films
              SET name = ?2, description = ?3, release_date = ?4,
                  duration = ?5, mpa = ?6, genres = ?7
            WHERE id = ?1",
          rusqlite::params![
            id.0,
            cols.name,
            cols.description,
            cols.release_date,
            cols.duration,
            cols.mpa,
            cols.genres,
          ],
        )?)
      })
      .await?;

    Ok((changed > 0).then(|| Film::from_new(id, input)))
  }

  async fn get_film(&self, id: FilmId) -> Result<Option<Film>> {
    let raw: Option<RawFilm> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM films WHERE id = ?1", RawFilm::COLUMNS),
            rusqlite::params![id.0],
            RawFilm::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawFilm::into_film).transpose()
  }

  async fn list_films(&self) -> Result<Vec<Film>> {
    let raws: Vec<RawFilm> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {} FROM films ORDER BY id", RawFilm::COLUMNS))?;
        let rows = stmt
          .query_map([], RawFilm::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFilm::into_film).collect()
  }

  async fn delete_film(&self, id: FilmId) -> Result<bool> {
    let deleted: usize = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM films WHERE id = ?1", [id.0])?))
      .await?;
    Ok(deleted > 0)
  }
}

// ─── EdgeStore impl ──────────────────────────────────────────────────────────

impl EdgeStore for SqliteStore {
  type Error = Error;

  // ── Friendship ────────────────────────────────────────────────────────

  async fn adjacency(&self, user: UserId) -> Result<Adjacency> {
    let (outgoing, incoming): (Vec<i64>, Vec<i64>) = self
      .conn
      .call(move |conn| {
        // One read transaction so both directions come from the same snapshot.
        let tx = conn.transaction()?;
        let outgoing = tx
          .prepare("SELECT to_user FROM friendship WHERE from_user = ?1")?
          .query_map([user.0], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        let incoming = tx
          .prepare("SELECT from_user FROM friendship WHERE to_user = ?1")?
          .query_map([user.0], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;
        tx.commit()?;
        Ok((outgoing, incoming))
      })
      .await?;

    Ok(Adjacency {
      outgoing: outgoing.into_iter().map(UserId).collect(),
      incoming: incoming.into_iter().map(UserId).collect(),
    })
  }

  async fn insert_friend_edges(&self, edges: &[FriendEdge]) -> Result<()> {
    let pairs: Vec<(i64, i64)> = edges.iter().map(|e| (e.from.0, e.to.0)).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt =
            tx.prepare("INSERT OR IGNORE INTO friendship (from_user, to_user) VALUES (?1, ?2)")?;
          for (from, to) in &pairs {
            stmt.execute([from, to])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove_friend_edges(&self, edges: &[FriendEdge]) -> Result<()> {
    let pairs: Vec<(i64, i64)> = edges.iter().map(|e| (e.from.0, e.to.0)).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt =
            tx.prepare("DELETE FROM friendship WHERE from_user = ?1 AND to_user = ?2")?;
          for (from, to) in &pairs {
            stmt.execute([from, to])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Likes ─────────────────────────────────────────────────────────────

  async fn likes(&self, film: FilmId) -> Result<BTreeSet<UserId>> {
    let users: Vec<i64> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare("SELECT user_id FROM likes WHERE film_id = ?1")?;
        let rows = stmt
          .query_map([film.0], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(users.into_iter().map(UserId).collect())
  }

  async fn insert_like(&self, film: FilmId, user: UserId) -> Result<bool> {
    let inserted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO likes (film_id, user_id) VALUES (?1, ?2)",
          [film.0, user.0],
        )?)
      })
      .await?;
    Ok(inserted > 0)
  }

  async fn remove_like(&self, film: FilmId, user: UserId) -> Result<bool> {
    let removed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM likes WHERE film_id = ?1 AND user_id = ?2",
          [film.0, user.0],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn like_sets(&self) -> Result<BTreeMap<FilmId, BTreeSet<UserId>>> {
    let rows: Vec<(i64, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT film_id, user_id FROM likes")?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut sets: BTreeMap<FilmId, BTreeSet<UserId>> = BTreeMap::new();
    for (film, user) in rows {
      sets.entry(FilmId(film)).or_default().insert(UserId(user));
    }
    Ok(sets)
  }
}
