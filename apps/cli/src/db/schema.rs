//! SQLite schema definitions.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema for the local database.
pub const SCHEMA: &str = r#"
-- Vocabulary items with their review statistics
CREATE TABLE IF NOT EXISTS vocabulary_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    term TEXT NOT NULL,
    term_key TEXT NOT NULL UNIQUE,
    meaning TEXT NOT NULL,
    example TEXT,
    tags TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    review_count INTEGER NOT NULL DEFAULT 0 CHECK (review_count >= 0),
    correct_count INTEGER NOT NULL DEFAULT 0 CHECK (correct_count >= 0 AND correct_count <= review_count),
    last_reviewed_at TEXT,
    next_review_at TEXT
);

-- Review history (append-only, outlives deleted items)
CREATE TABLE IF NOT EXISTS review_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id INTEGER NOT NULL,
    term TEXT NOT NULL,
    is_correct INTEGER NOT NULL,
    reviewed_at TEXT NOT NULL
);

CREATE TRIGGER IF NOT EXISTS review_history_no_update
BEFORE UPDATE ON review_history
BEGIN
    SELECT RAISE(ABORT, 'review history is append-only');
END;

CREATE TRIGGER IF NOT EXISTS review_history_no_delete
BEFORE DELETE ON review_history
BEGIN
    SELECT RAISE(ABORT, 'review history is append-only');
END;

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_items_next_review ON vocabulary_items(next_review_at);
CREATE INDEX IF NOT EXISTS idx_history_reviewed_at ON review_history(reviewed_at);
"#;

/// Record the schema version if not present.
pub const INIT_SCHEMA_VERSION: &str = r#"
INSERT OR IGNORE INTO schema_version (version) VALUES (1);
"#;
