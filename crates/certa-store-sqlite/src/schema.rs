//! SQL schema for the Certa SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- `seq` gives a stable insertion order and, with AUTOINCREMENT, is never
-- reused after a delete.
CREATE TABLE IF NOT EXISTS certificates (
    seq             INTEGER PRIMARY KEY AUTOINCREMENT,
    certificate_id  TEXT NOT NULL UNIQUE,
    candidate_name  TEXT NOT NULL,
    role            TEXT NOT NULL,
    duration        TEXT NOT NULL,
    access_code     TEXT NOT NULL,
    issue_date      TEXT NOT NULL,   -- RFC 3339 UTC; store-assigned
    created_by      TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS certificates_access_code_idx
    ON certificates(access_code);
CREATE INDEX IF NOT EXISTS certificates_issue_date_idx
    ON certificates(issue_date);

PRAGMA user_version = 1;
";
