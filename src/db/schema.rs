//! SQL DDL for the viewer catalog and the session table.
//! SQLite-first design; `foreign_keys` must be enabled on every connection
//! for the cascade rules below to apply.

/// SQLite schema with:
/// - `model3d` / `skybox` keyed internally by `id`, externally by UNIQUE `record_name`
/// - `screenshot.model3d_id` cascades on model deletion
/// - `screenshot.skybox_id` is nulled on skybox deletion
/// - `session_entries` keyed by (`session_id`, `key`), `expires_at` in unix seconds
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS model3d (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    record_name TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    extension TEXT NOT NULL DEFAULT '',
    alt_extension TEXT NOT NULL DEFAULT '',
    thumbnail BLOB NULL,
    model BLOB NULL,
    alt_model BLOB NULL
);

CREATE TABLE IF NOT EXISTS skybox (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    record_name TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    extension TEXT NOT NULL DEFAULT '',
    height REAL NULL,
    exposure REAL NULL,
    shadow_intensity REAL NULL,
    shadow_softness REAL NULL,
    image BLOB NULL
);

CREATE TABLE IF NOT EXISTS screenshot (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    model3d_id INTEGER NOT NULL REFERENCES model3d(id) ON DELETE CASCADE,
    skybox_id INTEGER NULL REFERENCES skybox(id) ON DELETE SET NULL,
    model_scale REAL NOT NULL DEFAULT 1.0,
    yaw_angle REAL NOT NULL DEFAULT 0.0,
    camera_position_x REAL NOT NULL DEFAULT 0.0,
    camera_position_y REAL NOT NULL DEFAULT 0.0,
    camera_position_z REAL NOT NULL DEFAULT 0.0,
    camera_target_x REAL NOT NULL DEFAULT 0.0,
    camera_target_y REAL NOT NULL DEFAULT 0.0,
    camera_target_z REAL NOT NULL DEFAULT 0.0,
    image BLOB NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_screenshot_model3d_id ON screenshot(model3d_id);
CREATE INDEX IF NOT EXISTS idx_screenshot_skybox_id ON screenshot(skybox_id);

CREATE TABLE IF NOT EXISTS session_entries (
    session_id TEXT NOT NULL,
    key TEXT NOT NULL,
    payload TEXT NOT NULL, -- JSON
    expires_at INTEGER NOT NULL, -- unix seconds
    PRIMARY KEY (session_id, key)
);

CREATE INDEX IF NOT EXISTS idx_session_entries_expires_at ON session_entries(expires_at);
"#;
