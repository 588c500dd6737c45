//! SQL schema for the filmrank SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- AUTOINCREMENT keeps identifiers of deleted rows from being handed out again.
CREATE TABLE IF NOT EXISTS users (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    email     TEXT NOT NULL,
    login     TEXT NOT NULL,
    name      TEXT NOT NULL,
    birthday  TEXT NOT NULL    -- ISO 8601 date
);

CREATE TABLE IF NOT EXISTS films (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    description   TEXT NOT NULL DEFAULT '',
    release_date  TEXT NOT NULL,    -- ISO 8601 date
    duration      INTEGER NOT NULL,
    mpa           TEXT,             -- 'G' | 'PG' | 'PG-13' | 'R' | 'NC-17'
    genres        TEXT NOT NULL DEFAULT '[]'
);

-- Directed request edges. A pair is mutual when both directions exist.
-- No foreign keys: deleting an entity leaves its edges behind, and readers
-- skip identifiers that no longer resolve.
CREATE TABLE IF NOT EXISTS friendship (
    from_user  INTEGER NOT NULL,
    to_user    INTEGER NOT NULL,
    PRIMARY KEY (from_user, to_user),
    CHECK (from_user != to_user)
);

CREATE TABLE IF NOT EXISTS likes (
    film_id  INTEGER NOT NULL,
    user_id  INTEGER NOT NULL,
    PRIMARY KEY (film_id, user_id)
);

CREATE INDEX IF NOT EXISTS friendship_to_idx ON friendship(to_user);

PRAGMA user_version = 1;
";
