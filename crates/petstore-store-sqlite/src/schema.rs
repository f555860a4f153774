//! SQL schema for the pet store SQLite database.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Reference data. Pets refer to categories by name at the API level.
CREATE TABLE IF NOT EXISTS categories (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE
);

-- Created on demand by pet writes; never deleted.
CREATE TABLE IF NOT EXISTS tags (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS pets (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id  INTEGER NOT NULL REFERENCES categories(id),
    name         TEXT NOT NULL,
    photo_urls   TEXT NOT NULL DEFAULT '',   -- delimiter-joined, opaque
    status       TEXT NOT NULL DEFAULT ''
);

-- Exactly the tags last written for each pet.
CREATE TABLE IF NOT EXISTS pet_tags (
    pet_id    INTEGER NOT NULL REFERENCES pets(id),
    tag_id    INTEGER NOT NULL REFERENCES tags(id),
    position  INTEGER NOT NULL,
    PRIMARY KEY (pet_id, tag_id)
);

CREATE TABLE IF NOT EXISTS orders (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    pet_id     INTEGER NOT NULL REFERENCES pets(id),
    quantity   INTEGER NOT NULL CHECK (quantity > 0),
    ship_date  TEXT NOT NULL,   -- RFC 3339 UTC
    status     TEXT NOT NULL,
    complete   INTEGER NOT NULL DEFAULT 0
);

-- Customer accounts. NULL email/phone never collide.
CREATE TABLE IF NOT EXISTS users (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    username       TEXT NOT NULL UNIQUE,
    first_name     TEXT NOT NULL DEFAULT '',
    last_name      TEXT NOT NULL DEFAULT '',
    email          TEXT UNIQUE,
    phone          TEXT UNIQUE,
    password_hash  TEXT NOT NULL,   -- argon2 PHC string
    user_status    INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS pets_status_idx   ON pets(status);
CREATE INDEX IF NOT EXISTS pet_tags_tag_idx  ON pet_tags(tag_id);
CREATE INDEX IF NOT EXISTS orders_pet_idx    ON orders(pet_id);

PRAGMA user_version = 1;
";
