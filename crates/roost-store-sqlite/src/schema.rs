//! SQL schema for the Roost SQLite store.
//!
//! Executed on every open. `PRAGMA user_version` records the layout for any
//! later migration.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS animals (
    animal_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL CHECK (length(name) > 0),
    species     TEXT,
    sex         TEXT CHECK (sex IN ('hen', 'rooster')),
    birthday    TEXT,            -- YYYY-MM-DD
    created_at  TEXT NOT NULL    -- RFC 3339 UTC; server-assigned
);

-- Notes are append-only; rows are only removed with their animal.
CREATE TABLE IF NOT EXISTS notes (
    note_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    animal_id   INTEGER NOT NULL REFERENCES animals(animal_id),
    body        TEXT NOT NULL CHECK (length(body) > 0),
    recorded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS images (
    image_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    animal_id   INTEGER NOT NULL REFERENCES animals(animal_id),
    data        BLOB NOT NULL CHECK (length(data) > 0),
    media_type  TEXT NOT NULL,
    caption     TEXT,
    recorded_at TEXT NOT NULL,
    is_primary  INTEGER NOT NULL DEFAULT 0 CHECK (is_primary IN (0, 1))
);

-- At most one primary image per animal.
CREATE UNIQUE INDEX IF NOT EXISTS images_one_primary_idx
    ON images(animal_id) WHERE is_primary = 1;

CREATE INDEX IF NOT EXISTS notes_animal_idx  ON notes(animal_id, recorded_at);
CREATE INDEX IF NOT EXISTS images_animal_idx ON images(animal_id, recorded_at);

PRAGMA user_version = 1;
";
