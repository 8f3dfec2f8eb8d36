//! SQL DDL for initializing the database schema.
//! SQLite-first design; the CSV seeding collaborator applies the same DDL.

/// SQLite schema includes:
/// - `abbreviations` table (one meaning per row; an abbreviation may repeat)
/// - `custom_terms` table (substring-searchable terms with definitions)
///
/// `source` is the provenance tag: 'csv' rows come from bulk seeding and are
/// protected from removal; 'custom' rows come from the add operation.
pub const SQLITE_INIT: &str = r"
-- ---------------------------------------------------------------------------
-- Abbreviations (exact case-insensitive lookup key)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS abbreviations (
    id INTEGER PRIMARY KEY NOT NULL,
    abbreviation TEXT NOT NULL,
    meaning TEXT NOT NULL,
    source TEXT NOT NULL DEFAULT 'csv',
    created_at TEXT NOT NULL DEFAULT (datetime('now')) -- RFC3339 on API inserts
);

CREATE INDEX IF NOT EXISTS idx_abbreviations_key ON abbreviations(abbreviation COLLATE NOCASE);

-- ---------------------------------------------------------------------------
-- Custom terms (substring case-insensitive lookup key)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS custom_terms (
    id INTEGER PRIMARY KEY NOT NULL,
    term TEXT NOT NULL,
    definition TEXT NOT NULL,
    source TEXT NOT NULL DEFAULT 'custom',
    created_at TEXT NOT NULL DEFAULT (datetime('now')) -- RFC3339 on API inserts
);

CREATE INDEX IF NOT EXISTS idx_custom_terms_key ON custom_terms(term COLLATE NOCASE);
";
