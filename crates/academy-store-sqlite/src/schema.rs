//! SQL schema for the Academy SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Every entity kind shares one table. `seq` preserves store order across
-- updates; `owner_id` mirrors the record's owning foreign key.
CREATE TABLE IF NOT EXISTS records (
    seq       INTEGER PRIMARY KEY AUTOINCREMENT,
    kind      TEXT    NOT NULL,   -- 'student' | 'program' | 'curriculum_item' | ...
    id        INTEGER NOT NULL,
    owner_id  INTEGER,
    body      TEXT    NOT NULL,   -- JSON-encoded entity
    UNIQUE (kind, id)
);

CREATE TABLE IF NOT EXISTS links (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    kind        TEXT    NOT NULL,
    left_id     INTEGER NOT NULL,
    right_id    INTEGER NOT NULL,
    is_default  INTEGER NOT NULL DEFAULT 0,
    progress    INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
    linked_at   TEXT,             -- ISO 8601 UTC or NULL
    UNIQUE (kind, left_id, right_id)
);

CREATE INDEX IF NOT EXISTS records_owner_idx ON records(kind, owner_id);
CREATE INDEX IF NOT EXISTS links_right_idx   ON links(kind, right_id);

PRAGMA user_version = 1;
";
