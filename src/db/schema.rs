//! SQL DDL for initializing the portal database.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `operators`: labeling accounts, `username` UNIQUE, argon2id `password_hash`
/// - `images`: one row per stored upload, `filename` UNIQUE (must match the
///   on-disk blob name), `label` defaulting to `unlabeled`, `timestamp` RFC3339
/// - indexes backing the unlabeled scan and per-device queries
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS operators (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL UNIQUE,
    timestamp TEXT NOT NULL, -- RFC3339
    label TEXT NOT NULL DEFAULT 'unlabeled',
    device_id TEXT NOT NULL DEFAULT 'unknown'
);

CREATE INDEX IF NOT EXISTS idx_images_label ON images(label);
CREATE INDEX IF NOT EXISTS idx_images_device_id ON images(device_id);
"#;
