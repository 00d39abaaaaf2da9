//! SQL schema for the mailroll SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS contacts (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    cid           TEXT NOT NULL UNIQUE,
    uid           TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    last_activity TEXT                      -- RFC 3339 UTC or NULL
);

CREATE TABLE IF NOT EXISTS mailing_lists (
    id                         INTEGER PRIMARY KEY AUTOINCREMENT,
    mlid                       TEXT NOT NULL UNIQUE,
    site_id                    INTEGER NOT NULL,
    title                      TEXT NOT NULL,
    verify_email_subject       TEXT,
    verify_email_template      TEXT,
    unsubscribe_email_subject  TEXT,
    unsubscribe_email_template TEXT
);

-- One row per contact/list pair; timestamps record the first time each
-- status was entered after a change.
CREATE TABLE IF NOT EXISTS contact_mailing_lists (
    contact_id          INTEGER NOT NULL REFERENCES contacts(id),
    mailing_list_id     INTEGER NOT NULL REFERENCES mailing_lists(id),
    subscription_status TEXT NOT NULL,   -- 'subscribed' | 'unsubscribed'
    subscribed          TEXT,
    unsubscribed        TEXT,
    verified            TEXT,
    source_type         TEXT NOT NULL DEFAULT '',
    source              TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (contact_id, mailing_list_id)
);

CREATE TABLE IF NOT EXISTS pending_contacts (
    pid             TEXT PRIMARY KEY,
    email           TEXT NOT NULL,
    mailing_list_id INTEGER NOT NULL REFERENCES mailing_lists(id),
    source          TEXT NOT NULL DEFAULT '',
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS cml_list_idx       ON contact_mailing_lists(mailing_list_id);
CREATE INDEX IF NOT EXISTS pending_email_idx  ON pending_contacts(email);

PRAGMA user_version = 1;
";
