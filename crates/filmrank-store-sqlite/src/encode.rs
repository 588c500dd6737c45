//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as ISO 8601 `YYYY-MM-DD` strings. Genres are stored as a
//! compact JSON array. The MPA rating is stored as its display label.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use filmrank_core::{
  film::{Film, FilmId, Mpa},
  user::{Relations, User, UserId},
};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Mpa ─────────────────────────────────────────────────────────────────────

pub fn decode_mpa(s: &str) -> Result<Mpa> {
  Mpa::parse(s).ok_or_else(|| Error::Decode { column: "mpa", value: s.to_owned() })
}

// ─── Genres ──────────────────────────────────────────────────────────────────

pub fn encode_genres(genres: &BTreeSet<String>) -> Result<String> {
  Ok(serde_json::to_string(genres)?)
}

pub fn decode_genres(s: &str) -> Result<BTreeSet<String>> { Ok(serde_json::from_str(s)?) }

// ─── Duration ────────────────────────────────────────────────────────────────

pub fn decode_duration(raw: i64) -> Result<u32> {
  u32::try_from(raw).map_err(|_| Error::Decode { column: "duration", value: raw.to_string() })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub id:       i64,
  pub email:    String,
  pub login:    String,
  pub name:     String,
  pub birthday: String,
}

impl RawUser {
  pub const COLUMNS: &'static str = "id, email, login, name, birthday";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:       row.get(0)?,
      email:    row.get(1)?,
      login:    row.get(2)?,
      name:     row.get(3)?,
      birthday: row.get(4)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:        UserId(self.id),
      email:     self.email,
      login:     self.login,
      name:      self.name,
      birthday:  decode_date(&self.birthday)?,
      relations: Relations::default(),
    })
  }
}

/// Raw values read directly from a `films` row.
pub struct RawFilm {
  pub id:           i64,
  pub name:         String,
  pub description:  String,
  pub release_date: String,
  pub duration:     i64,
  pub mpa:          Option<String>,
  pub genres:       String,
}

impl RawFilm {
  pub const COLUMNS: &'static str =
    "id, name, description, release_date, duration, mpa, genres";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      name:         row.get(1)?,
      description:  row.get(2)?,
      release_date: row.get(3)?,
      duration:     row.get(4)?,
      mpa:          row.get(5)?,
      genres:       row.get(6)?,
    })
  }

  pub fn into_film(self) -> Result<Film> {
    Ok(Film {
      id:           FilmId(self.id),
      name:         self.name,
      description:  self.description,
      release_date: decode_date(&self.release_date)?,
      duration:     decode_duration(self.duration)?,
      mpa:          self.mpa.as_deref().map(decode_mpa).transpose()?,
      genres:       decode_genres(&self.genres)?,
      likes:        BTreeSet::new(),
    })
  }
}
