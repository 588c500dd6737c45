//! Films and their like sets.

use std::{collections::BTreeSet, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, user::UserId};

/// Maximum description length, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// Store-assigned film identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FilmId(pub i64);

impl fmt::Display for FilmId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// MPA classification rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mpa {
  #[serde(rename = "G")]
  G,
  #[serde(rename = "PG")]
  Pg,
  #[serde(rename = "PG-13")]
  Pg13,
  #[serde(rename = "R")]
  R,
  #[serde(rename = "NC-17")]
  Nc17,
}

impl Mpa {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::G => "G",
      Self::Pg => "PG",
      Self::Pg13 => "PG-13",
      Self::R => "R",
      Self::Nc17 => "NC-17",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "G" => Some(Self::G),
      "PG" => Some(Self::Pg),
      "PG-13" => Some(Self::Pg13),
      "R" => Some(Self::R),
      "NC-17" => Some(Self::Nc17),
      _ => None,
    }
  }
}

// ─── Film ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Film {
  pub id:           FilmId,
  pub name:         String,
  pub description:  String,
  pub release_date: NaiveDate,
  /// Runtime in minutes.
  pub duration:     u32,
  pub mpa:          Option<Mpa>,
  #[serde(default)]
  pub genres:       BTreeSet<String>,
  /// Users who like this film. Derived from the like edges on read.
  #[serde(default)]
  pub likes:        BTreeSet<UserId>,
}

impl Film {
  pub fn from_new(id: FilmId, input: NewFilm) -> Self {
    Self {
      id,
      name: input.name,
      description: input.description,
      release_date: input.release_date,
      duration: input.duration,
      mpa: input.mpa,
      genres: input.genres,
      likes: BTreeSet::new(),
    }
  }
}

// ─── NewFilm ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::EntityStore::add_film`] and `update_film`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFilm {
  pub name:         String,
  #[serde(default)]
  pub description:  String,
  pub release_date: NaiveDate,
  pub duration:     u32,
  #[serde(default)]
  pub mpa:          Option<Mpa>,
  #[serde(default)]
  pub genres:       BTreeSet<String>,
}

impl NewFilm {
  pub fn new(name: impl Into<String>, release_date: NaiveDate, duration: u32) -> Self {
    Self {
      name: name.into(),
      description: String::new(),
      release_date,
      duration,
      mpa: None,
      genres: BTreeSet::new(),
    }
  }

  /// The first public film screening; nothing can be released earlier.
  pub fn earliest_release_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1895, 12, 28).unwrap_or(NaiveDate::MIN)
  }

  pub fn validate(&self, today: NaiveDate) -> Result<()> {
    if self.name.trim().is_empty() {
      return Err(Error::Invalid("film name cannot be empty".into()));
    }
    if self.description.chars().count() > MAX_DESCRIPTION_LEN {
      return Err(Error::Invalid(format!(
        "description is limited to {MAX_DESCRIPTION_LEN} characters"
      )));
    }
    if self.release_date < Self::earliest_release_date() {
      return Err(Error::Invalid("release date cannot be earlier than 1895-12-28".into()));
    }
    if self.release_date > today {
      return Err(Error::Invalid("release date cannot be in the future".into()));
    }
    if self.duration == 0 {
      return Err(Error::Invalid("duration must be positive".into()));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

  #[test]
  fn validate_release_date_bounds() {
    let today = date(2024, 6, 1);
    let mut film = NewFilm::new("Arrival of a Train", date(1895, 12, 28), 1);
    assert!(film.validate(today).is_ok());

    film.release_date = date(1895, 12, 27);
    assert!(matches!(film.validate(today), Err(Error::Invalid(_))));

    film.release_date = date(2025, 1, 1);
    assert!(matches!(film.validate(today), Err(Error::Invalid(_))));
  }

  #[test]
  fn validate_description_and_duration() {
    let today = date(2024, 6, 1);
    let mut film = NewFilm::new("Heat", date(1995, 12, 15), 170);
    film.description = "x".repeat(MAX_DESCRIPTION_LEN);
    assert!(film.validate(today).is_ok());

    film.description.push('x');
    assert!(film.validate(today).is_err());

    film.description.clear();
    film.duration = 0;
    assert!(film.validate(today).is_err());

    film.duration = 170;
    film.name = " ".into();
    assert!(film.validate(today).is_err());
  }

  #[test]
  fn mpa_uses_display_names() {
    assert_eq!(serde_json::to_string(&Mpa::Pg13).unwrap(), "\"PG-13\"");
    let parsed: Mpa = serde_json::from_str("\"NC-17\"").unwrap();
    assert_eq!(parsed, Mpa::Nc17);
    assert_eq!(Mpa::parse(Mpa::R.as_str()), Some(Mpa::R));
    assert_eq!(Mpa::parse("X"), None);
  }
}
